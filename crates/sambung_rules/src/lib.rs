//! Pure word-chain game logic.
//!
//! Players alternate submitting words; each word must begin with the last
//! letter of the previous one and may not repeat. This crate holds the local
//! rules and the session state machine. It performs no I/O: dictionary and
//! theme judgements, and the machine's moves, are requested as [`Effect`]s and
//! answered with events.
//!
//! # Example
//!
//! ```
//! use sambung_rules::{Effect, GameSession, Mode, Resolution, SessionEvent, Theme, Verdict};
//!
//! let step = GameSession::default().apply(SessionEvent::StartGame {
//!     mode: Mode::LocalTwoPlayer,
//!     theme: Theme::Any,
//! });
//! let step = step.session.apply(SessionEvent::Submit { word: "kucing".into() });
//! let ticket = step.effects[0].ticket();
//! let step = step.session.apply(SessionEvent::ValidationResolved {
//!     ticket,
//!     outcome: Resolution::Answered(Verdict::accept("baku")),
//! });
//! assert_eq!(step.session.state().last_word(), Some("kucing"));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod clock;
mod event;
pub mod invariants;
mod session;
mod types;

pub use chain::{ChainError, ChainValidator, UsedWords, normalize};
pub use clock::{ClockTick, TURN_DURATION_SECS, TurnClock};
pub use event::{
    Effect, EndReason, GameOutcome, Notice, Proposal, Resolution, SessionEvent, Ticket, Verdict,
};
pub use session::{GameSession, PendingCall, Phase, SessionState, Step};
pub use types::{Mode, MoveId, MoveRecord, PlayerId, Theme, first_letter, last_letter};
