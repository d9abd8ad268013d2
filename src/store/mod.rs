//! Durable per-user reading logs.
//!
//! Each user owns one UTF-8 file `<dir>/<user id>.txt` holding one reading per
//! line. Every operation on a user runs under that user's mutex, so appends,
//! removals and reads of the same log are totally ordered; different users
//! never contend.

mod error;
mod locks;

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use tempfile::NamedTempFile;

use crate::{
    log_error, log_info,
    models::{Reading, UserId},
};

pub use error::{StoreError, StoreResult};
use locks::{lock_ignoring_poison, UserLocks};

const ENABLE_LOGS: bool = true;

struct StoreInner {
    dir: PathBuf,
    locks: UserLocks,
}

#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<StoreInner>,
}

impl RecordStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(StoreError::io(&dir))?;

        log_info!("Record store opened at {}", dir.display());

        Ok(Self {
            inner: Arc::new(StoreInner {
                dir,
                locks: UserLocks::default(),
            }),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    pub fn log_path(&self, user: UserId) -> PathBuf {
        self.inner.dir.join(user.log_file_name())
    }

    fn with_user<T>(
        &self,
        user: UserId,
        task: impl FnOnce(&Path) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let handle = self.inner.locks.handle(user);
        let _guard = lock_ignoring_poison(&handle);
        task(&self.log_path(user))
    }

    /// Adds `reading` as the newest entry of the user's log. A failed write is
    /// rolled back so the log never ends in a partial line.
    pub fn append(&self, user: UserId, reading: &Reading) -> StoreResult<()> {
        let line = reading.to_line().map_err(StoreError::Unencodable)?;

        self.with_user(user, |path| {
            let mut file = OpenOptions::new()
                .read(true)
                .append(true)
                .create(true)
                .open(path)
                .map_err(StoreError::io(path))?;
            let prior_len = file.metadata().map_err(StoreError::io(path))?.len();

            append_line(&mut file, prior_len, &line).map_err(StoreError::io(path))?;

            log_info!("Appended reading for user {user}: {}", line.trim_end());
            Ok(())
        })
    }

    /// All readings of the user, oldest first. No log means no readings.
    pub fn read_all(&self, user: UserId) -> StoreResult<Vec<Reading>> {
        self.with_user(user, |path| {
            read_lines(path)?
                .into_iter()
                .map(|(number, line)| decode(path, number, &line))
                .collect()
        })
    }

    pub fn count(&self, user: UserId) -> StoreResult<usize> {
        self.read_all(user).map(|readings| readings.len())
    }

    /// Removes and returns the newest reading. The shortened log replaces the
    /// old one in a single rename.
    pub fn remove_last(&self, user: UserId) -> StoreResult<Option<Reading>> {
        self.with_user(user, |path| {
            let mut lines = read_lines(path)?;
            let Some((number, last)) = lines.pop() else {
                return Ok(None);
            };
            let removed = decode(path, number, &last)?;

            if lines.is_empty() {
                remove_if_exists(path)?;
            } else {
                self.replace_log(path, &lines)?;
            }

            log_info!(
                "Removed last reading {}/{} for user {user}",
                removed.systolic,
                removed.diastolic
            );
            Ok(Some(removed))
        })
    }

    /// Deletes the whole log. Clearing an absent log succeeds.
    pub fn clear(&self, user: UserId) -> StoreResult<()> {
        self.with_user(user, |path| {
            remove_if_exists(path)?;
            log_info!("Cleared log for user {user}");
            Ok(())
        })
    }

    /// Raw log content for download, or `None` when there is nothing to export.
    pub fn export(&self, user: UserId) -> StoreResult<Option<Vec<u8>>> {
        self.with_user(user, |path| {
            let Some(contents) = read_text(path)? else {
                return Ok(None);
            };
            if non_blank_lines(&contents).is_empty() {
                return Ok(None);
            }
            Ok(Some(contents.into_bytes()))
        })
    }

    fn replace_log(&self, path: &Path, lines: &[(usize, String)]) -> StoreResult<()> {
        let dir = self.dir();
        let mut staged = NamedTempFile::new_in(dir).map_err(StoreError::io(dir))?;
        for (_, line) in lines {
            writeln!(staged, "{line}").map_err(StoreError::io(staged.path()))?;
        }
        staged
            .as_file()
            .sync_all()
            .map_err(StoreError::io(staged.path()))?;
        staged
            .persist(path)
            .map_err(|err| StoreError::io(path)(err.error))?;
        Ok(())
    }
}

/// The file operations an append relies on.
trait AppendTarget: Read + Write + Seek {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl AppendTarget for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Writes `line` after `prior_len` bytes. On failure the target is cut back to
/// `prior_len`, so the log never ends in a partial line.
fn append_line<T: AppendTarget>(target: &mut T, prior_len: u64, line: &str) -> io::Result<()> {
    let result = write_line(target, prior_len, line);
    if result.is_err() {
        if let Err(rollback) = target.truncate_to(prior_len) {
            log_error!("Failed to roll back partial append: {rollback}");
        }
    }
    result
}

fn write_line<T: AppendTarget>(target: &mut T, prior_len: u64, line: &str) -> io::Result<()> {
    // Logs written by older tools may lack the final line break.
    if prior_len > 0 && !ends_with_newline(target, prior_len)? {
        target.write_all(b"\n")?;
    }
    target.write_all(line.as_bytes())?;
    target.sync()
}

fn ends_with_newline<T: Read + Seek>(target: &mut T, len: u64) -> io::Result<bool> {
    let mut last = [0u8; 1];
    target.seek(SeekFrom::Start(len - 1))?;
    target.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn read_text(path: &Path) -> StoreResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::io(path)(err)),
    }
}

/// Non-blank lines with their 1-based line numbers.
fn non_blank_lines(contents: &str) -> Vec<(usize, String)> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line.to_string()))
        .collect()
}

fn read_lines(path: &Path) -> StoreResult<Vec<(usize, String)>> {
    Ok(read_text(path)?
        .map(|contents| non_blank_lines(&contents))
        .unwrap_or_default())
}

fn decode(path: &Path, number: usize, line: &str) -> StoreResult<Reading> {
    Reading::from_line(line).map_err(|reason| StoreError::Corrupt {
        path: path.to_path_buf(),
        line: number,
        reason,
    })
}

fn remove_if_exists(path: &Path) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StoreError::io(path)(err)),
    }
}
