//! Detection of "no information available" replies.
//!
//! Numeric confidence and textual content are independent signals: an
//! upstream answer can clear the threshold and still be a refusal. Text is
//! normalized by dropping whitespace and periods, then compared for exact
//! equality against a configured set of canonical phrasings.

use std::collections::HashSet;

/// Remove every whitespace and period character.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '.' | '。' | '．'))
        .collect()
}

/// Matches text against canonical refusal phrasings.
#[derive(Debug, Clone)]
pub struct NoDataDetector {
    phrases: HashSet<String>,
}

impl NoDataDetector {
    /// Build a detector from raw phrasings; blank entries are ignored.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| normalize(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    /// True when `text` normalizes to one of the canonical phrasings.
    ///
    /// Blank text is not a phrase; emptiness is handled by the policy.
    pub fn is_no_data_phrase(&self, text: &str) -> bool {
        let normalized = normalize(text);
        !normalized.is_empty() && self.phrases.contains(&normalized)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
