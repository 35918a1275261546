//! The session state machine.
//!
//! [`GameSession::apply`] is the single transition function. It never
//! performs I/O: oracle calls leave the reducer as [`Effect`]s and come back
//! as `*Resolved` events carrying the ticket they were issued with.

use super::chain::{ChainValidator, UsedWords, normalize};
use super::clock::{ClockTick, TURN_DURATION_SECS, TurnClock};
use super::event::{
    Effect, EndReason, GameOutcome, Notice, Proposal, Resolution, SessionEvent, Ticket, Verdict,
};
use super::invariants::assert_invariants;
use super::types::{Mode, MoveId, MoveRecord, PlayerId, Theme, last_letter};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Coarse lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Phase {
    /// No session.
    Menu,
    /// Moves are being played.
    Active,
    /// Someone won; waiting for rematch or menu.
    GameOver,
}

/// The oracle call the session is waiting on. At most one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingCall {
    /// Waiting for a verdict on `word`, submitted by `author`.
    Validation {
        /// Ticket the reply must carry.
        ticket: Ticket,
        /// Normalized candidate.
        word: String,
        /// Who submitted it.
        author: PlayerId,
    },
    /// Waiting for the machine's proposal.
    Proposal {
        /// Ticket the reply must carry.
        ticket: Ticket,
    },
}

impl PendingCall {
    /// Ticket of this call.
    pub fn ticket(&self) -> Ticket {
        match self {
            PendingCall::Validation { ticket, .. } | PendingCall::Proposal { ticket } => *ticket,
        }
    }
}

/// Read-only snapshot of a session, suitable for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SessionState {
    /// Participants and turn order; `Menu` when no session runs.
    pub(crate) mode: Mode,
    /// Session topic.
    pub(crate) theme: Theme,
    /// Player to move.
    pub(crate) active: PlayerId,
    /// Committed moves in play order.
    pub(crate) history: Vec<MoveRecord>,
    /// Set once the session has ended.
    pub(crate) outcome: Option<GameOutcome>,
    /// Countdown for the active turn.
    pub(crate) clock: TurnClock,
    /// Outstanding oracle call, if any.
    pub(crate) pending: Option<PendingCall>,
    /// Latest transient message.
    pub(crate) notice: Option<Notice>,
}

impl SessionState {
    fn menu(theme: Theme, turn_secs: u32) -> Self {
        Self {
            mode: Mode::Menu,
            theme,
            active: PlayerId::Human1,
            history: Vec::new(),
            outcome: None,
            clock: TurnClock::new(turn_secs),
            pending: None,
            notice: None,
        }
    }

    fn fresh(mode: Mode, theme: Theme, turn_secs: u32) -> Self {
        Self {
            mode,
            active: mode.first_player(),
            ..Self::menu(theme, turn_secs)
        }
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        if self.mode == Mode::Menu {
            Phase::Menu
        } else if self.outcome.is_some() {
            Phase::GameOver
        } else {
            Phase::Active
        }
    }

    /// Number of chained words; always the history length.
    pub fn streak(&self) -> usize {
        self.history.len()
    }

    /// Word of the final history entry.
    pub fn last_word(&self) -> Option<&str> {
        self.history.last().map(|r| r.word().as_str())
    }

    /// Letter the next word must start with.
    pub fn required_letter(&self) -> Option<char> {
        self.last_word().and_then(last_letter)
    }

    /// True once a winner is known.
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Winner, once the session has ended.
    pub fn winner(&self) -> Option<PlayerId> {
        self.outcome.map(|o| o.winner)
    }

    /// Seconds left in the active turn.
    pub fn remaining_secs(&self) -> u32 {
        self.clock.remaining()
    }

    /// True while an oracle call is outstanding. The clock does not run.
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Every played word, for case-insensitive repetition checks.
    pub fn used_words(&self) -> UsedWords {
        self.history.iter().map(|r| r.word().as_str()).collect()
    }
}

/// Result of one transition.
#[derive(Debug)]
pub struct Step {
    /// The session after the event.
    pub session: GameSession,
    /// I/O to perform.
    pub effects: Vec<Effect>,
}

/// The word-chain state machine.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
    turn_secs: u32,
    epoch: u64,
    next_serial: u64,
    next_move_id: u64,
}

impl GameSession {
    /// Creates a session sitting at the menu.
    #[instrument]
    pub fn new(turn_secs: u32) -> Self {
        Self {
            state: SessionState::menu(Theme::default(), turn_secs),
            turn_secs,
            epoch: 0,
            next_serial: 0,
            next_move_id: 0,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current generation; changes on every start and every return to menu.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Applies one event, consuming the session and returning its successor.
    #[instrument(skip(self), fields(phase = %self.state.phase(), epoch = self.epoch))]
    pub fn apply(mut self, event: SessionEvent) -> Step {
        let effects = match event {
            SessionEvent::StartGame { mode, theme } => self.start(mode, theme),
            SessionEvent::ReturnToMenu => self.return_to_menu(),
            SessionEvent::Submit { word } => self.submit(&word),
            SessionEvent::Tick => self.tick(),
            SessionEvent::ValidationResolved { ticket, outcome } => {
                self.resolve_validation(ticket, outcome)
            }
            SessionEvent::ProposalResolved { ticket, outcome } => {
                self.resolve_proposal(ticket, outcome)
            }
        };
        Step {
            session: self,
            effects,
        }
    }

    fn start(&mut self, mode: Mode, theme: Theme) -> Vec<Effect> {
        if !mode.is_playable() {
            warn!("Ignoring start request without a playable mode");
            return Vec::new();
        }
        if self.state.phase() == Phase::Active {
            warn!("Ignoring start request while a session is active");
            return Vec::new();
        }

        self.begin_epoch();
        self.state = SessionState::fresh(mode, theme, self.turn_secs);
        info!(%mode, %theme, epoch = self.epoch, "Session started");
        self.hand_over_turn()
    }

    fn return_to_menu(&mut self) -> Vec<Effect> {
        if let Some(pending) = &self.state.pending {
            debug!(ticket = %pending.ticket(), "Abandoning outstanding oracle call");
        }
        self.begin_epoch();
        self.state = SessionState::menu(self.state.theme, self.turn_secs);
        info!(epoch = self.epoch, "Returned to menu");
        Vec::new()
    }

    fn submit(&mut self, raw: &str) -> Vec<Effect> {
        if self.state.phase() != Phase::Active {
            debug!("Ignoring submission outside an active session");
            return Vec::new();
        }
        if self.state.pending.is_some() {
            debug!("Ignoring submission while an oracle call is pending");
            return Vec::new();
        }
        if self.state.active.is_machine() {
            debug!("Ignoring human submission on the machine's turn");
            return Vec::new();
        }

        self.state.notice = None;
        let author = self.state.active;
        match ChainValidator::check(raw, self.state.last_word(), &self.state.used_words()) {
            Ok(word) => self.request_validation(word, author),
            Err(e) => {
                info!(%author, error = %e, "Submission failed chain check");
                self.state.notice = Some(Notice::Chain(e));
                Vec::new()
            }
        }
    }

    fn tick(&mut self) -> Vec<Effect> {
        if self.state.phase() != Phase::Active || self.state.pending.is_some() {
            return Vec::new();
        }

        if self.state.clock.tick() == ClockTick::Expired {
            let loser = self.state.active;
            info!(%loser, "Turn clock expired");
            if let Some(winner) = self.state.mode.opponent_of(loser) {
                self.finish(winner, EndReason::Timeout);
            }
        }
        Vec::new()
    }

    fn resolve_validation(&mut self, ticket: Ticket, outcome: Resolution<Verdict>) -> Vec<Effect> {
        let (word, author) = match self.state.pending.take() {
            Some(PendingCall::Validation {
                ticket: expected,
                word,
                author,
            }) if expected == ticket => (word, author),
            other => {
                debug!(%ticket, "Dropping stale validation result");
                self.state.pending = other;
                return Vec::new();
            }
        };

        match outcome {
            Resolution::Unavailable(reason) => {
                warn!(%word, %reason, "Oracle unavailable, accepting word");
                let effects = self.commit(word, author);
                self.state.notice = Some(Notice::AcceptedOffline);
                effects
            }
            Resolution::Answered(verdict) if !verdict.is_valid => {
                info!(%word, %author, explanation = %verdict.explanation, "Oracle rejected word");
                if author.is_machine() {
                    self.forfeit_machine();
                } else {
                    let explanation = if verdict.explanation.trim().is_empty() {
                        "Kata tidak valid menurut KBBI.".to_string()
                    } else {
                        verdict.explanation
                    };
                    self.state.notice = Some(Notice::InvalidWord(explanation));
                }
                Vec::new()
            }
            Resolution::Answered(verdict) if !verdict.fits_theme => {
                info!(%word, %author, theme = %self.state.theme, "Word does not fit theme");
                if author.is_machine() {
                    self.forfeit_machine();
                } else {
                    self.state.notice = Some(Notice::ThemeMismatch(self.state.theme));
                }
                Vec::new()
            }
            Resolution::Answered(_) => self.commit(word, author),
        }
    }

    fn resolve_proposal(&mut self, ticket: Ticket, outcome: Resolution<Proposal>) -> Vec<Effect> {
        match self.state.pending.take() {
            Some(PendingCall::Proposal { ticket: expected }) if expected == ticket => {}
            other => {
                debug!(%ticket, "Dropping stale proposal result");
                self.state.pending = other;
                return Vec::new();
            }
        }

        let proposal = match outcome {
            Resolution::Answered(p) => p,
            Resolution::Unavailable(reason) => {
                warn!(%reason, "Proposal call failed, machine surrenders");
                self.surrender_machine();
                return Vec::new();
            }
        };

        if proposal.surrender || normalize(&proposal.word).is_empty() {
            self.surrender_machine();
            return Vec::new();
        }

        match ChainValidator::check(
            &proposal.word,
            self.state.last_word(),
            &self.state.used_words(),
        ) {
            Ok(word) => self.request_validation(word, PlayerId::Machine),
            Err(e) => {
                warn!(word = %proposal.word, error = %e, "Machine proposal breaks the chain");
                self.forfeit_machine();
                Vec::new()
            }
        }
    }

    fn request_validation(&mut self, word: String, author: PlayerId) -> Vec<Effect> {
        let ticket = self.issue_ticket();
        debug!(%ticket, %word, %author, "Requesting validation");
        self.state.pending = Some(PendingCall::Validation {
            ticket,
            word: word.clone(),
            author,
        });
        vec![Effect::Validate {
            ticket,
            word,
            theme: self.state.theme,
        }]
    }

    fn commit(&mut self, word: String, author: PlayerId) -> Vec<Effect> {
        let id = MoveId(self.next_move_id);
        self.next_move_id += 1;

        info!(%id, %word, %author, "Move committed");
        self.state.history.push(MoveRecord::new(id, word, author));

        match self.state.mode.next_player(author) {
            Some(next) => self.state.active = next,
            None => warn!(%author, mode = %self.state.mode, "Author has no successor in mode"),
        }
        self.state.clock.reset();
        self.state.notice = None;

        assert_invariants(&self.state);

        self.hand_over_turn()
    }

    /// Starts the machine's move if it is now the machine's turn.
    fn hand_over_turn(&mut self) -> Vec<Effect> {
        if self.state.phase() != Phase::Active || !self.state.active.is_machine() {
            return Vec::new();
        }

        let ticket = self.issue_ticket();
        debug!(%ticket, "Requesting machine proposal");
        self.state.pending = Some(PendingCall::Proposal { ticket });
        vec![Effect::Propose {
            ticket,
            history: self.state.history.clone(),
            last_word: self.state.last_word().map(str::to_string),
            theme: self.state.theme,
        }]
    }

    fn surrender_machine(&mut self) {
        if let Some(winner) = self.state.mode.opponent_of(PlayerId::Machine) {
            self.finish(winner, EndReason::Surrender);
        }
    }

    fn forfeit_machine(&mut self) {
        if let Some(winner) = self.state.mode.opponent_of(PlayerId::Machine) {
            self.finish(winner, EndReason::MachineForfeit);
        }
    }

    fn finish(&mut self, winner: PlayerId, reason: EndReason) {
        info!(%winner, %reason, streak = self.state.streak(), "Session over");
        self.state.pending = None;
        self.state.outcome = Some(GameOutcome { winner, reason });
    }

    fn begin_epoch(&mut self) {
        self.epoch += 1;
        self.next_serial = 0;
        self.next_move_id = 0;
    }

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = Ticket {
            epoch: self.epoch,
            serial: self.next_serial,
        };
        self.next_serial += 1;
        ticket
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(TURN_DURATION_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainError;

    fn step(session: GameSession, event: SessionEvent) -> (GameSession, Vec<Effect>) {
        let Step { session, effects } = session.apply(event);
        (session, effects)
    }

    fn started(mode: Mode) -> GameSession {
        step(
            GameSession::default(),
            SessionEvent::StartGame {
                mode,
                theme: Theme::Any,
            },
        )
        .0
    }

    fn submit(session: GameSession, word: &str) -> (GameSession, Vec<Effect>) {
        step(
            session,
            SessionEvent::Submit {
                word: word.to_string(),
            },
        )
    }

    fn answer(
        session: GameSession,
        effects: &[Effect],
        verdict: Verdict,
    ) -> (GameSession, Vec<Effect>) {
        let ticket = effects[0].ticket();
        step(
            session,
            SessionEvent::ValidationResolved {
                ticket,
                outcome: Resolution::Answered(verdict),
            },
        )
    }

    #[test]
    fn test_new_session_sits_at_menu() {
        let session = GameSession::default();
        assert_eq!(session.state().phase(), Phase::Menu);
        assert_eq!(session.state().remaining_secs(), TURN_DURATION_SECS);
    }

    #[test]
    fn test_menu_mode_cannot_start() {
        let (session, effects) = step(
            GameSession::default(),
            SessionEvent::StartGame {
                mode: Mode::Menu,
                theme: Theme::Any,
            },
        );
        assert!(effects.is_empty());
        assert_eq!(session.state().phase(), Phase::Menu);
        assert_eq!(session.epoch(), 0);
    }

    #[test]
    fn test_submission_waits_for_oracle_and_pauses_clock() {
        let session = started(Mode::LocalTwoPlayer);
        let (session, effects) = submit(session, "Kucing");
        assert!(matches!(&effects[..], [Effect::Validate { word, .. }] if word == "kucing"));
        assert!(session.state().is_waiting());

        let (session, _) = step(session, SessionEvent::Tick);
        assert_eq!(session.state().remaining_secs(), TURN_DURATION_SECS);
    }

    #[test]
    fn test_second_submission_ignored_while_pending() {
        let session = started(Mode::LocalTwoPlayer);
        let (session, first) = submit(session, "kucing");
        let (session, second) = submit(session, "kuda");
        assert!(second.is_empty());
        assert_eq!(session.state().pending().as_ref().map(|p| p.ticket()), Some(first[0].ticket()));
    }

    #[test]
    fn test_chain_error_keeps_clock_running() {
        let session = started(Mode::LocalTwoPlayer);
        let (session, effects) = submit(session, "kucing");
        let (session, _) = answer(session, &effects, Verdict::accept("ok"));
        let (session, _) = step(session, SessionEvent::Tick);
        let (session, effects) = submit(session, "harimau");

        assert!(effects.is_empty());
        assert_eq!(
            session.state().notice(),
            &Some(Notice::Chain(ChainError::LetterMismatch { expected: 'g' }))
        );
        assert_eq!(session.state().active(), &PlayerId::Human2);
        assert_eq!(session.state().remaining_secs(), TURN_DURATION_SECS - 1);
    }

    #[test]
    fn test_local_timeout_awards_other_human() {
        let mut session = GameSession::new(2);
        session = step(
            session,
            SessionEvent::StartGame {
                mode: Mode::LocalTwoPlayer,
                theme: Theme::Animals,
            },
        )
        .0;
        let (session, effects) = submit(session, "kucing");
        let (session, _) = answer(session, &effects, Verdict::accept("ok"));
        let (session, _) = step(session, SessionEvent::Tick);
        let (session, _) = step(session, SessionEvent::Tick);

        assert_eq!(session.state().phase(), Phase::GameOver);
        assert_eq!(
            session.state().outcome(),
            &Some(GameOutcome {
                winner: PlayerId::Human1,
                reason: EndReason::Timeout
            })
        );
        assert_eq!(session.state().remaining_secs(), 0);
    }

    #[test]
    fn test_game_over_freezes_clock_and_turn() {
        let session = GameSession::new(1);
        let (session, _) = step(
            session,
            SessionEvent::StartGame {
                mode: Mode::VersusMachine,
                theme: Theme::Any,
            },
        );
        let (session, _) = step(session, SessionEvent::Tick);
        assert_eq!(session.state().winner(), Some(PlayerId::Machine));

        let (session, _) = step(session, SessionEvent::Tick);
        let (session, effects) = submit(session, "kucing");
        assert!(effects.is_empty());
        assert_eq!(session.state().active(), &PlayerId::Human1);
        assert_eq!(session.state().streak(), 0);
    }

    #[test]
    fn test_rematch_starts_new_epoch() {
        let session = GameSession::new(1);
        let (session, _) = step(
            session,
            SessionEvent::StartGame {
                mode: Mode::LocalTwoPlayer,
                theme: Theme::Jobs,
            },
        );
        let (session, _) = step(session, SessionEvent::Tick);
        let epoch = session.epoch();
        let (session, _) = step(
            session,
            SessionEvent::StartGame {
                mode: Mode::LocalTwoPlayer,
                theme: Theme::Jobs,
            },
        );
        assert_eq!(session.state().phase(), Phase::Active);
        assert_eq!(session.epoch(), epoch + 1);
        assert!(session.state().history().is_empty());
    }

    #[test]
    fn test_start_ignored_while_active() {
        let session = started(Mode::LocalTwoPlayer);
        let epoch = session.epoch();
        let (session, _) = step(
            session,
            SessionEvent::StartGame {
                mode: Mode::VersusMachine,
                theme: Theme::Any,
            },
        );
        assert_eq!(session.epoch(), epoch);
        assert_eq!(session.state().mode(), &Mode::LocalTwoPlayer);
    }

    #[test]
    fn test_blank_explanation_gets_default_message() {
        let session = started(Mode::LocalTwoPlayer);
        let (session, effects) = submit(session, "xyzzy");
        let (session, _) = answer(
            session,
            &effects,
            Verdict {
                is_valid: false,
                fits_theme: false,
                explanation: " ".to_string(),
            },
        );
        assert_eq!(
            session.state().notice(),
            &Some(Notice::InvalidWord("Kata tidak valid menurut KBBI.".to_string()))
        );
    }
}
