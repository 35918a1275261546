//! Local chain-rule checks run before the oracle is consulted.
//!
//! These checks are pure and deterministic: the same candidate, prior word
//! and used-word set always produce the same answer.

use super::types::{first_letter, last_letter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Why a candidate failed the local checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum ChainError {
    /// Nothing left after trimming.
    #[display("Kata kosong")]
    Empty,
    /// More than one token was submitted.
    #[display("Hanya satu kata!")]
    MultiToken,
    /// Candidate does not start with the previous word's last letter.
    #[display("Kata harus dimulai dengan huruf '{}'!", expected.to_uppercase())]
    LetterMismatch {
        /// Required first letter (lowercase).
        expected: char,
    },
    /// Candidate was already played this session.
    #[display("Kata '{}' sudah digunakan!", _0)]
    Duplicate(String),
}

impl std::error::Error for ChainError {}

/// Words already played in a session, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedWords(HashSet<String>);

impl UsedWords {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a word.
    pub fn insert(&mut self, word: &str) {
        self.0.insert(word.to_lowercase());
    }

    /// True if `word` (in any case) is present.
    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&word.to_lowercase())
    }
}

impl<'a> FromIterator<&'a str> for UsedWords {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut used = Self::new();
        for word in iter {
            used.insert(word);
        }
        used
    }
}

/// Trims and lowercases raw input.
pub fn normalize(candidate: &str) -> String {
    candidate.trim().to_lowercase()
}

/// Stateless validator for the chain rule.
pub struct ChainValidator;

impl ChainValidator {
    /// Checks `candidate` against the chain and returns the normalized token.
    ///
    /// Checks run in order: empty, single token, first-letter continuity,
    /// then repetition.
    #[instrument(skip(used), fields(used = used.0.len()))]
    pub fn check(
        candidate: &str,
        prior_word: Option<&str>,
        used: &UsedWords,
    ) -> Result<String, ChainError> {
        let word = normalize(candidate);

        if word.is_empty() {
            return Err(ChainError::Empty);
        }

        if word.chars().any(char::is_whitespace) {
            return Err(ChainError::MultiToken);
        }

        if let Some(expected) = prior_word.and_then(last_letter)
            && first_letter(&word) != Some(expected)
        {
            debug!(%word, %expected, "First letter does not continue the chain");
            return Err(ChainError::LetterMismatch { expected });
        }

        if used.contains(&word) {
            return Err(ChainError::Duplicate(word));
        }

        Ok(word)
    }
}
