//! Blood pressure journal fed by chat messages.
//!
//! [`classifier`] decides whether a message is a measurement, a malformed
//! measurement or small talk; [`store`] keeps one append-only log per user;
//! [`conversation`] ties both to dialog replies for any chat front end.

pub mod classifier;
pub mod console;
pub mod conversation;
pub mod models;
pub mod settings;
pub mod store;
pub mod utils;

use std::{env, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};

pub use classifier::{classify, classify_at, Intent, IntentMatcher, Outcome, Rejection};
pub use conversation::{Conversation, Message, Reply};
pub use models::{Reading, UserId};
pub use settings::{AppConfig, Limits};
pub use store::{RecordStore, StoreError};

const DEFAULT_CONFIG_PATH: &str = "metrix.json";

/// Boots the console front end: logging, config, store, then the dialog loop
/// on stdin/stdout until end of input.
pub fn run() -> Result<()> {
    utils::logging::init();
    log::info!("Metrix starting up...");

    let config_path = env::var_os("METRIX_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Arc::new(AppConfig::load(&config_path)?);

    let store = RecordStore::open(&config.data_dir)
        .with_context(|| format!("failed to open record store {}", config.data_dir.display()))?;

    let user = match env::var("METRIX_USER") {
        Ok(raw) => UserId(
            raw.parse()
                .with_context(|| format!("METRIX_USER must be an integer, got '{raw}'"))?,
        ),
        Err(_) => UserId(0),
    };
    let first_name = env::var("METRIX_NAME")
        .or_else(|_| env::var("USER"))
        .unwrap_or_else(|_| "friend".into());

    let conversation = Conversation::new(config, store);
    let documents_dir = env::current_dir().context("failed to resolve current directory")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        let input = tokio::io::BufReader::new(tokio::io::stdin());
        console::serve(
            &conversation,
            user,
            &first_name,
            input,
            tokio::io::stdout(),
            &documents_dir,
        )
        .await
    })?;

    log::info!("Metrix shutting down");
    Ok(())
}
