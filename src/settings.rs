//! Startup configuration: numeric bounds, dialog texts and the keyword
//! dictionary. Loaded once and shared read-only afterwards.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Open-interval sanity bounds for pressure and pulse values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_bp: u32,
    pub min_bp: u32,
    pub max_pulse: u32,
    pub min_pulse: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_bp: 250,
            min_bp: 30,
            max_pulse: 220,
            min_pulse: 30,
        }
    }
}

impl Limits {
    fn validate(&self) -> Result<()> {
        if self.min_bp >= self.max_bp {
            bail!(
                "min_bp ({}) must be lower than max_bp ({})",
                self.min_bp,
                self.max_bp
            );
        }
        if self.min_pulse >= self.max_pulse {
            bail!(
                "min_pulse ({}) must be lower than max_pulse ({})",
                self.min_pulse,
                self.max_pulse
            );
        }
        Ok(())
    }
}

/// Reply templates. `{}` placeholders are filled positionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialog {
    pub welcome_first: String,
    pub welcome_returning: String,
    pub hello: String,
    pub help: String,
    pub not_understood: String,
    pub got_it_pair: String,
    pub got_it_with_pulse: String,
    pub check_failed: String,
    pub single_value: String,
    pub record_deleted: String,
    pub nothing_to_delete: String,
    pub nothing_to_save: String,
    pub cleanup_started: String,
    pub cleanup_done: String,
    pub storage_failed: String,
    pub document_name: String,
    pub document_caption: String,
}

impl Default for Dialog {
    fn default() -> Self {
        Self {
            welcome_first: "Hi, {}! Send me your blood pressure as two numbers, e.g. 120 80, \
                            optionally followed by your pulse and a comment."
                .into(),
            welcome_returning: "Welcome back! You have {} records so far.".into(),
            hello: "Hello, {}!".into(),
            help: "Send: systolic diastolic [pulse] [comment], e.g. `120 80 70 after a walk`.\n\
                   /save - download your records\n\
                   /del - delete the last record\n\
                   /cleanup - delete all records"
                .into(),
            not_understood: "Sorry, I did not get that. Type /help to see what I can do.".into(),
            got_it_pair: "Got it: {}/{}".into(),
            got_it_with_pulse: "Got it: {}/{}, pulse {}".into(),
            check_failed: "Is {}/{} really your blood pressure? Please check and send again."
                .into(),
            single_value: "One number is not enough. Feed me 2 or 3 values.".into(),
            record_deleted: "Record {}/{} deleted.".into(),
            nothing_to_delete: "No records to delete yet.".into(),
            nothing_to_save: "No records to save yet.".into(),
            cleanup_started: "About to delete all records...".into(),
            cleanup_done: "Done".into(),
            storage_failed: "Sorry, I could not access your records. Please try again later."
                .into(),
            document_name: "My blood pressure.csv".into(),
            document_caption: "My blood pressure records".into(),
        }
    }
}

/// Words that reveal a conversational intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Dictionary {
    pub hello: Vec<String>,
    pub help: Vec<String>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self {
            hello: ["hi", "hello", "hey", "morning", "привет", "здравствуйте"]
                .into_iter()
                .map(String::from)
                .collect(),
            help: ["help", "how", "what", "?", "помощь", "помоги"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub limits: Limits,
    pub dialog: Dialog,
    pub dictionary: Dictionary,
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            dialog: Dialog::default(),
            dictionary: Dictionary::default(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl AppConfig {
    /// Reads the JSON config at `path`. A missing file yields the defaults;
    /// an unreadable or inconsistent one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.limits.validate()?;
        Ok(config)
    }
}

/// Fills `{}` placeholders left to right. Surplus placeholders stay as they
/// are, surplus arguments are dropped.
pub fn fill(template: &str, args: &[&dyn std::fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => out.push_str(&arg.to_string()),
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.limits, Limits::default());
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            AppConfig::from_json(r#"{ "limits": { "max_bp": 200, "min_bp": 40 } }"#).unwrap();
        assert_eq!(config.limits.max_bp, 200);
        assert_eq!(config.limits.min_bp, 40);
        assert_eq!(config.limits.max_pulse, 220);
        assert_eq!(config.dialog.cleanup_done, "Done");
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = AppConfig::from_json(r#"{ "limits": { "max_pulse": 20, "min_pulse": 40 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("min_pulse"));
    }

    #[test]
    fn load_reports_the_path_of_a_broken_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn fill_substitutes_in_order() {
        assert_eq!(fill("Got it: {}/{}", &[&120, &80]), "Got it: 120/80");
        assert_eq!(fill("{} and {}", &[&"one"]), "one and {}");
        assert_eq!(fill("no holes", &[&1]), "no holes");
    }
}
