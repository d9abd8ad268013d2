use serde::Serialize;

use crate::models::Reading;

/// What a rejected numeric message looked like. Both fields are `None` when
/// the message carried a single number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub systolic: Option<u32>,
    pub diastolic: Option<u32>,
}

impl Rejection {
    pub fn lone_value() -> Self {
        Self {
            systolic: None,
            diastolic: None,
        }
    }

    pub fn pair(systolic: u32, diastolic: u32) -> Self {
        Self {
            systolic: Some(systolic),
            diastolic: Some(diastolic),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    Accepted(Reading),
    Rejected(Rejection),
    Talk,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Accepted(_) => "data_accepted",
            Outcome::Rejected(_) => "data_rejected",
            Outcome::Talk => "talk",
        }
    }
}
