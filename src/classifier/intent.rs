use std::collections::HashMap;


use crate::settings::Dictionary;

/// Characters stripped from both ends of every word before lookup.
const PUNCTUATION: &[char] = &['!', ':', ')', '(', ',', '*', ';', '-', '.', '?'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Hello,
    Help,
}

/// Word-to-intent lookup for conversational messages.
#[derive(Debug, Clone, Default)]
pub struct IntentMatcher {
    words: HashMap<String, Intent>,
}

impl IntentMatcher {
    pub fn new(dictionary: &Dictionary) -> Self {
        let mut words = HashMap::new();
        // Hello goes in last so it wins for words listed under both intents.
        for (list, intent) in [(&dictionary.help, Intent::Help), (&dictionary.hello, Intent::Hello)]
        {
            for word in list {
                let key = normalize(word);
                if !key.is_empty() {
                    words.insert(key, intent);
                }
            }
        }
        Self { words }
    }

    /// Intent of the first recognised word, scanning in message order.
    pub fn detect(&self, message: &str) -> Option<Intent> {
        message
            .split_whitespace()
            .map(normalize)
            .find_map(|word| self.words.get(&word).copied())
    }
}

fn normalize(word: &str) -> String {
    let trimmed = word.trim_matches(PUNCTUATION);
    // A word made only of punctuation (e.g. "?") is looked up as-is.
    if trimmed.is_empty() {
        word.to_lowercase()
    } else {
        trimmed.to_lowercase()
    }
}
