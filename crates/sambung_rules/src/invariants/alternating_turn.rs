//! Alternating turn invariant: authors follow the mode's turn order.

use super::Invariant;
use crate::session::SessionState;

/// Invariant: players alternate strictly.
///
/// The first move belongs to the mode's first player, each later move to the
/// successor of the previous author, and the active player is the successor
/// of the last author (never the player who just moved). Every author must
/// take part in the mode.
pub struct AlternatingTurnInvariant;

impl Invariant<SessionState> for AlternatingTurnInvariant {
    fn holds(state: &SessionState) -> bool {
        let mode = *state.mode();
        let history = state.history();

        let Some(first) = history.first() else {
            return *state.active() == mode.first_player();
        };

        if *first.author() != mode.first_player() {
            return false;
        }

        if !history.iter().all(|record| mode.includes(*record.author())) {
            return false;
        }

        let alternates = history
            .windows(2)
            .all(|pair| mode.next_player(*pair[0].author()) == Some(*pair[1].author()));

        let ids_ordered = history.windows(2).all(|pair| pair[0].id() < pair[1].id());

        let last_author = *history[history.len() - 1].author();
        alternates && ids_ordered && mode.next_player(last_author) == Some(*state.active())
    }

    fn description() -> &'static str {
        "Players alternate turns in mode order"
    }
}
