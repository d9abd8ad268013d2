//! Turns one free-text chat message into an [`Outcome`].
//!
//! A message holding two or three whole numbers is a measurement: the first two
//! are systolic and diastolic pressure, the third is the pulse. Everything that
//! is not a plain number becomes the comment.

pub mod intent;
pub mod outcome;

use chrono::{Local, NaiveDateTime};

use crate::{models::Reading, settings::Limits};

pub use intent::{Intent, IntentMatcher};
pub use outcome::{Outcome, Rejection};

/// Classifies `message` stamped with the current local time.
pub fn classify(message: &str, limits: &Limits) -> Outcome {
    classify_at(message, limits, Local::now().naive_local())
}

pub fn classify_at(message: &str, limits: &Limits, now: NaiveDateTime) -> Outcome {
    let mut values = Vec::new();
    let mut others = Vec::new();

    for token in message.split_whitespace() {
        match parse_value(token) {
            Some(value) => values.push(value),
            None => others.push(token),
        }
    }

    let (systolic, diastolic) = match values.as_slice() {
        [] => return Outcome::Talk,
        [_] => return Outcome::Rejected(Rejection::lone_value()),
        [systolic, diastolic, ..] => (*systolic, *diastolic),
    };

    if !pressure_in_bounds(systolic, diastolic, limits) {
        return Outcome::Rejected(Rejection::pair(systolic, diastolic));
    }

    // An implausible pulse is dropped; it never rejects the pressure pair.
    let pulse = values
        .get(2)
        .copied()
        .filter(|pulse| limits.max_pulse > *pulse && *pulse > limits.min_pulse);

    Outcome::Accepted(Reading::new(
        now,
        systolic,
        diastolic,
        pulse,
        others.join(" "),
    ))
}

fn pressure_in_bounds(systolic: u32, diastolic: u32, limits: &Limits) -> bool {
    limits.max_bp > systolic && systolic > diastolic && diastolic > limits.min_bp
}

/// Digit-only tokens are numbers; anything with a sign, dot or letter is not.
fn parse_value(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(token.parse().unwrap_or(u32::MAX))
}
