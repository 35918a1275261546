//! Events fed into the session reducer and the effects it asks for.
//!
//! Events are the only way a session changes. Effects are requests for I/O
//! that the caller performs and answers with a later event carrying the same
//! [`Ticket`].

use super::chain::ChainError;
use super::types::{Mode, MoveRecord, PlayerId, Theme};
use serde::{Deserialize, Serialize};

/// Identifies one outstanding oracle request.
///
/// `epoch` changes whenever a session starts or is abandoned, so a reply to a
/// request from an earlier session never matches the pending ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}/{}", epoch, serial)]
pub struct Ticket {
    /// Session generation.
    pub epoch: u64,
    /// Request number within the generation.
    pub serial: u64,
}

/// The oracle's judgement of one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The word exists in the dictionary.
    pub is_valid: bool,
    /// The word belongs to the session theme.
    pub fits_theme: bool,
    /// Short reason, shown to the player on rejection.
    pub explanation: String,
}

impl Verdict {
    /// A verdict accepting the word.
    pub fn accept(explanation: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            fits_theme: true,
            explanation: explanation.into(),
        }
    }
}

/// The oracle's proposed machine move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposed word; ignored when `surrender` is set.
    pub word: String,
    /// The machine gives up.
    pub surrender: bool,
}

impl Proposal {
    /// A proposal that plays `word`.
    pub fn play(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            surrender: false,
        }
    }

    /// A proposal that gives up.
    pub fn surrender() -> Self {
        Self {
            word: String::new(),
            surrender: true,
        }
    }
}

/// How an oracle call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution<T> {
    /// The oracle answered.
    Answered(T),
    /// The call failed; carries a description of the failure.
    Unavailable(String),
}

/// Inputs to [`GameSession::apply`](crate::GameSession::apply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Start a new session (from the menu or as a rematch).
    StartGame {
        /// Participants and turn order.
        mode: Mode,
        /// Topic for the whole session.
        theme: Theme,
    },
    /// Abandon the session and return to the menu.
    ReturnToMenu,
    /// The active human submitted a word.
    Submit {
        /// Raw input as typed or transcribed.
        word: String,
    },
    /// One second elapsed.
    Tick,
    /// A validation request finished.
    ValidationResolved {
        /// Ticket from the matching [`Effect::Validate`].
        ticket: Ticket,
        /// What the oracle said.
        outcome: Resolution<Verdict>,
    },
    /// A proposal request finished.
    ProposalResolved {
        /// Ticket from the matching [`Effect::Propose`].
        ticket: Ticket,
        /// What the oracle said.
        outcome: Resolution<Proposal>,
    },
}

/// I/O the reducer needs performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Ask the oracle whether `word` is valid and on theme.
    Validate {
        /// Reply with this ticket.
        ticket: Ticket,
        /// Normalized candidate.
        word: String,
        /// Session theme.
        theme: Theme,
    },
    /// Ask the oracle for the machine's next word.
    Propose {
        /// Reply with this ticket.
        ticket: Ticket,
        /// Full chain so far.
        history: Vec<MoveRecord>,
        /// Word to continue from.
        last_word: Option<String>,
        /// Session theme.
        theme: Theme,
    },
}

impl Effect {
    /// Ticket the reply must carry.
    pub fn ticket(&self) -> Ticket {
        match self {
            Effect::Validate { ticket, .. } | Effect::Propose { ticket, .. } => *ticket,
        }
    }
}

/// Transient message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Notice {
    /// Local chain rule failed.
    #[display("{}", _0)]
    Chain(ChainError),
    /// Oracle says the word is not a dictionary word.
    #[display("{}", _0)]
    InvalidWord(String),
    /// Oracle says the word is off theme.
    #[display("Kata tidak sesuai tema '{}'!", _0)]
    ThemeMismatch(Theme),
    /// Oracle was unreachable and the word was accepted anyway.
    #[display("Valid (pemeriksaan offline)")]
    AcceptedOffline,
}

impl Notice {
    /// True for notices that rejected a submission.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Notice::AcceptedOffline)
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum EndReason {
    /// The loser's turn clock ran out.
    #[display("waktu habis")]
    Timeout,
    /// The machine gave up, or its proposal call failed.
    #[display("AI menyerah")]
    Surrender,
    /// The machine proposed a word that failed validation.
    #[display("AI memberi kata tidak sah")]
    MachineForfeit,
}

/// Final result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Who won.
    pub winner: PlayerId,
    /// How it ended.
    pub reason: EndReason,
}
