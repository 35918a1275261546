//! First-class invariants for a word-chain session.
//!
//! Invariants are logical properties that must hold after every commit.
//! They are checked in debug builds and can be tested independently.

use super::session::SessionState;
use tracing::{instrument, warn};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

pub mod alternating_turn;
pub mod chain_continuity;
pub mod unique_words;

pub use alternating_turn::AlternatingTurnInvariant;
pub use chain_continuity::ChainContinuityInvariant;
pub use unique_words::UniqueWordsInvariant;

/// All session invariants as a composable set.
pub type SessionInvariants = (
    ChainContinuityInvariant,
    UniqueWordsInvariant,
    AlternatingTurnInvariant,
);

/// Asserts that all session invariants hold (panics on violation in debug builds).
#[instrument(skip(state))]
pub fn assert_invariants(state: &SessionState) {
    if cfg!(debug_assertions)
        && let Err(violations) = SessionInvariants::check_all(state)
    {
        for v in &violations {
            warn!(invariant = %v.description, "Session invariant violated");
        }
        panic!("Session invariants violated: {:?}", violations);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::session::SessionState;
    use crate::{GameSession, Mode, MoveId, MoveRecord, PlayerId, SessionEvent, Theme};

    /// An active session state with `words` already committed, authors
    /// alternating from the mode's first player.
    pub fn state_with(mode: Mode, words: &[&str]) -> SessionState {
        let session = GameSession::default()
            .apply(SessionEvent::StartGame {
                mode,
                theme: Theme::Any,
            })
            .session;
        let mut state = session.state().clone();
        let mut author = mode.first_player();
        for (i, word) in words.iter().enumerate() {
            state
                .history
                .push(MoveRecord::new(MoveId(i as u64), *word, author));
            author = mode.next_player(author).unwrap_or(PlayerId::Human1);
        }
        state.active = author;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::state_with;
    use super::*;
    use crate::Mode;

    #[test]
    fn test_invariant_set_holds_for_empty_session() {
        let state = state_with(Mode::VersusMachine, &[]);
        assert!(SessionInvariants::check_all(&state).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_for_valid_chain() {
        let state = state_with(Mode::LocalTwoPlayer, &["kucing", "gajah", "harimau"]);
        assert!(SessionInvariants::check_all(&state).is_ok());
    }

    #[test]
    fn test_invariant_set_reports_every_violation() {
        let state = state_with(Mode::LocalTwoPlayer, &["kucing", "kucing"]);
        let violations = SessionInvariants::check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_two_invariants_as_set() {
        let state = state_with(Mode::VersusMachine, &["kucing", "gajah"]);
        type TwoInvariants = (ChainContinuityInvariant, UniqueWordsInvariant);
        assert!(TwoInvariants::check_all(&state).is_ok());
    }
}
