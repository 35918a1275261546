//! Chain continuity invariant: each word starts with the previous word's last letter.

use super::Invariant;
use crate::session::SessionState;
use crate::types::{first_letter, last_letter};

/// Invariant: every committed word after the first begins with the final
/// letter of the word before it, compared case-insensitively.
pub struct ChainContinuityInvariant;

impl Invariant<SessionState> for ChainContinuityInvariant {
    fn holds(state: &SessionState) -> bool {
        state.history().windows(2).all(|pair| {
            let expected = last_letter(pair[0].word());
            expected.is_some() && first_letter(pair[1].word()) == expected
        })
    }

    fn description() -> &'static str {
        "Each word begins with the last letter of the previous word"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mode;
    use crate::invariants::fixtures::state_with;

    #[test]
    fn test_single_word_holds() {
        let state = state_with(Mode::VersusMachine, &["kucing"]);
        assert!(ChainContinuityInvariant::holds(&state));
    }

    #[test]
    fn test_mixed_case_chain_holds() {
        let state = state_with(Mode::LocalTwoPlayer, &["KucinG", "gajah", "Harimau"]);
        assert!(ChainContinuityInvariant::holds(&state));
    }

    #[test]
    fn test_broken_link_violates() {
        let state = state_with(Mode::LocalTwoPlayer, &["kucing", "harimau"]);
        assert!(!ChainContinuityInvariant::holds(&state));
    }
}
