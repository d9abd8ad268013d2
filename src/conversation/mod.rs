//! Transport-independent dialog: one incoming message in, replies out.

pub mod commands;
pub mod replies;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::{
    classifier::{self, Intent, IntentMatcher, Outcome},
    log_error, log_warn,
    models::UserId,
    settings::AppConfig,
    store::{RecordStore, StoreResult},
};

pub use commands::Command;
pub use replies::{Reply, Responder};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone)]
pub struct Message {
    pub user: UserId,
    pub first_name: String,
    pub text: String,
}

impl Message {
    pub fn new(user: UserId, first_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user,
            first_name: first_name.into(),
            text: text.into(),
        }
    }
}

#[derive(Serialize)]
struct UserAction<'a> {
    user_id: UserId,
    content_type: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a Outcome>,
}

fn user_action_line(
    message: &Message,
    content_type: &str,
    outcome: Option<&Outcome>,
) -> serde_json::Result<String> {
    serde_json::to_string(&UserAction {
        user_id: message.user,
        content_type,
        message: &message.text,
        outcome,
    })
}

/// Emits one structured line per handled message for later analysis.
fn record_user_action(message: &Message, content_type: &str, outcome: Option<&Outcome>) {
    match user_action_line(message, content_type, outcome) {
        Ok(json) => log::info!(target: "metrix::actions", "{json}"),
        Err(err) => log_warn!("Failed to serialize user action: {err}"),
    }
}

#[derive(Clone)]
pub struct Conversation {
    config: Arc<AppConfig>,
    store: RecordStore,
    intents: IntentMatcher,
    responder: Responder,
}

impl Conversation {
    pub fn new(config: Arc<AppConfig>, store: RecordStore) -> Self {
        let intents = IntentMatcher::new(&config.dictionary);
        let responder = Responder::new(config.dialog.clone());
        Self {
            config,
            store,
            intents,
            responder,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub async fn handle(&self, message: &Message) -> Vec<Reply> {
        match Command::parse(&message.text) {
            Some(command) => {
                record_user_action(message, "command", None);
                self.run_command(message, command).await
            }
            None => self.converse(message).await,
        }
    }

    async fn run_command(&self, message: &Message, command: Command) -> Vec<Reply> {
        let user = message.user;
        match command {
            Command::Start => {
                let count = self.execute(move |store| store.count(user)).await;
                vec![self.or_storage_failed(count, |count| {
                    self.responder.welcome(&message.first_name, count)
                })]
            }
            Command::Help => vec![self.responder.help()],
            Command::Save => {
                let export = self.execute(move |store| store.export(user)).await;
                vec![self.or_storage_failed(export, |bytes| self.responder.export(bytes))]
            }
            Command::DeleteLast => {
                let removed = self.execute(move |store| store.remove_last(user)).await;
                vec![self.or_storage_failed(removed, |removed| {
                    self.responder.deleted(removed.as_ref())
                })]
            }
            Command::Cleanup => {
                let cleared = self.execute(move |store| store.clear(user)).await;
                vec![
                    self.responder.cleanup_started(),
                    self.or_storage_failed(cleared, |()| self.responder.cleanup_done()),
                ]
            }
            Command::Unknown(_) => vec![self.responder.not_understood()],
        }
    }

    async fn converse(&self, message: &Message) -> Vec<Reply> {
        let outcome = classifier::classify(&message.text, &self.config.limits);
        record_user_action(message, outcome.as_str(), Some(&outcome));

        let reply = match outcome {
            Outcome::Accepted(reading) => {
                let user = message.user;
                let stored = reading.clone();
                let appended = self
                    .execute(move |store| store.append(user, &stored))
                    .await;
                self.or_storage_failed(appended, |()| self.responder.accepted(&reading))
            }
            Outcome::Rejected(rejection) => self.responder.rejected(&rejection),
            Outcome::Talk => match self.intents.detect(&message.text) {
                Some(Intent::Hello) => self.responder.hello(&message.first_name),
                Some(Intent::Help) => self.responder.help(),
                None => self.responder.not_understood(),
            },
        };
        vec![reply]
    }

    /// Runs a blocking store task off the async runtime.
    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&RecordStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || task(&store))
            .await
            .map_err(|err| anyhow!("store task terminated unexpectedly: {err}"))?
            .map_err(anyhow::Error::from)
    }

    fn or_storage_failed<T>(&self, result: Result<T>, render: impl FnOnce(T) -> Reply) -> Reply {
        match result {
            Ok(value) => render(value),
            Err(err) => {
                log_error!("Record store failure: {err:#}");
                self.responder.storage_failed()
            }
        }
    }
}
