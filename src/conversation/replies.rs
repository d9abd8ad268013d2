use crate::{
    classifier::Rejection,
    models::Reading,
    settings::{fill, Dialog},
};

/// Something to send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Document {
        name: String,
        caption: String,
        bytes: Vec<u8>,
    },
}

impl Reply {
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Document { .. } => None,
        }
    }
}

/// Renders dialog templates into replies.
#[derive(Debug, Clone)]
pub struct Responder {
    dialog: Dialog,
}

impl Responder {
    pub fn new(dialog: Dialog) -> Self {
        Self { dialog }
    }

    pub fn welcome(&self, name: &str, records: usize) -> Reply {
        if records > 0 {
            self.say(&self.dialog.welcome_returning, &[&records])
        } else {
            self.say(&self.dialog.welcome_first, &[&name])
        }
    }

    pub fn hello(&self, name: &str) -> Reply {
        self.say(&self.dialog.hello, &[&name])
    }

    pub fn help(&self) -> Reply {
        Reply::Text(self.dialog.help.clone())
    }

    pub fn not_understood(&self) -> Reply {
        Reply::Text(self.dialog.not_understood.clone())
    }

    pub fn accepted(&self, reading: &Reading) -> Reply {
        match reading.pulse {
            Some(pulse) => self.say(
                &self.dialog.got_it_with_pulse,
                &[&reading.systolic, &reading.diastolic, &pulse],
            ),
            None => self.say(
                &self.dialog.got_it_pair,
                &[&reading.systolic, &reading.diastolic],
            ),
        }
    }

    pub fn rejected(&self, rejection: &Rejection) -> Reply {
        match (rejection.systolic, rejection.diastolic) {
            (Some(systolic), Some(diastolic)) => {
                self.say(&self.dialog.check_failed, &[&systolic, &diastolic])
            }
            _ => Reply::Text(self.dialog.single_value.clone()),
        }
    }

    pub fn deleted(&self, removed: Option<&Reading>) -> Reply {
        match removed {
            Some(reading) => self.say(
                &self.dialog.record_deleted,
                &[&reading.systolic, &reading.diastolic],
            ),
            None => Reply::Text(self.dialog.nothing_to_delete.clone()),
        }
    }

    pub fn export(&self, bytes: Option<Vec<u8>>) -> Reply {
        match bytes {
            Some(bytes) => Reply::Document {
                name: self.dialog.document_name.clone(),
                caption: self.dialog.document_caption.clone(),
                bytes,
            },
            None => Reply::Text(self.dialog.nothing_to_save.clone()),
        }
    }

    pub fn cleanup_started(&self) -> Reply {
        Reply::Text(self.dialog.cleanup_started.clone())
    }

    pub fn cleanup_done(&self) -> Reply {
        Reply::Text(self.dialog.cleanup_done.clone())
    }

    pub fn storage_failed(&self) -> Reply {
        Reply::Text(self.dialog.storage_failed.clone())
    }

    fn say(&self, template: &str, args: &[&dyn std::fmt::Display]) -> Reply {
        Reply::Text(fill(template, args))
    }
}
