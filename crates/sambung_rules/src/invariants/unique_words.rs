//! Uniqueness invariant: no word is played twice in one session.

use super::Invariant;
use crate::session::SessionState;
use std::collections::HashSet;

/// Invariant: no two committed words are equal ignoring case.
pub struct UniqueWordsInvariant;

impl Invariant<SessionState> for UniqueWordsInvariant {
    fn holds(state: &SessionState) -> bool {
        let mut seen = HashSet::new();
        state
            .history()
            .iter()
            .all(|record| seen.insert(record.word().to_lowercase()))
    }

    fn description() -> &'static str {
        "No word appears twice in a session"
    }
}
