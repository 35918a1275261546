//! Application state and key handling.

use crate::driver::DriverCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use derive_getters::Getters;
use sambung_rules::{EndReason, Mode, PendingCall, Phase, PlayerId, SessionState, Theme};
use tracing::debug;

/// Modes offered in the menu, top to bottom.
const MENU_MODES: [Mode; 2] = [Mode::VersusMachine, Mode::LocalTwoPlayer];

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond redrawing.
    None,
    /// Forward a command to the session driver.
    Send(DriverCommand),
    /// Leave the application.
    Quit,
}

/// Main application state.
#[derive(Debug, Clone, Getters)]
pub struct App {
    /// Theme highlighted in the menu.
    theme: Theme,
    /// Mode highlighted in the menu.
    mode: Mode,
    /// Word being typed.
    input: String,
    /// Latest session snapshot.
    snapshot: SessionState,
}

impl App {
    /// Creates the app with menu preselections.
    pub fn new(mode: Option<Mode>, theme: Theme, snapshot: SessionState) -> Self {
        let mode = mode
            .filter(|m| m.is_playable())
            .unwrap_or(Mode::VersusMachine);
        Self {
            theme,
            mode,
            input: String::new(),
            snapshot,
        }
    }

    /// Replaces the snapshot, clearing stale input when the screen changes.
    pub fn update(&mut self, snapshot: SessionState) {
        if snapshot.phase() != self.snapshot.phase() {
            self.input.clear();
        }
        self.snapshot = snapshot;
    }

    /// True when the keyboard may type a word right now.
    pub fn accepts_input(&self) -> bool {
        self.snapshot.phase() == Phase::Active
            && !self.snapshot.active().is_machine()
            && !self.snapshot.is_waiting()
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match self.snapshot.phase() {
            Phase::Menu => self.handle_menu_key(key.code),
            Phase::Active => self.handle_game_key(key.code),
            Phase::GameOver => self.handle_game_over_key(key.code),
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Left => self.theme = self.theme.previous(),
            KeyCode::Right | KeyCode::Tab => self.theme = self.theme.next(),
            KeyCode::Up | KeyCode::Down => {
                self.mode = if self.mode == MENU_MODES[0] {
                    MENU_MODES[1]
                } else {
                    MENU_MODES[0]
                };
            }
            KeyCode::Enter => {
                debug!(mode = %self.mode, theme = %self.theme, "Starting from menu");
                return self.start();
            }
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            _ => {}
        }
        Action::None
    }

    fn handle_game_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Esc => Action::Send(DriverCommand::ReturnToMenu),
            KeyCode::Enter if self.accepts_input() => {
                let word = std::mem::take(&mut self.input);
                Action::Send(DriverCommand::Submit(word))
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) if self.accepts_input() => {
                self.input.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_game_over_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Enter | KeyCode::Char('r') => {
                self.mode = *self.snapshot.mode();
                self.theme = *self.snapshot.theme();
                self.start()
            }
            KeyCode::Char('m') | KeyCode::Esc => Action::Send(DriverCommand::ReturnToMenu),
            KeyCode::Char('q') => Action::Quit,
            _ => Action::None,
        }
    }

    fn start(&self) -> Action {
        Action::Send(DriverCommand::Start {
            mode: self.mode,
            theme: self.theme,
        })
    }

    /// Heading naming whose turn it is.
    pub fn turn_label(&self) -> String {
        match (*self.snapshot.mode(), *self.snapshot.active()) {
            (Mode::VersusMachine, PlayerId::Human1) => "Giliran Kamu".to_string(),
            (_, player) => format!("Giliran {}", player),
        }
    }

    /// Status line while an oracle call is outstanding.
    pub fn waiting_label(&self) -> Option<&'static str> {
        match self.snapshot.pending() {
            Some(PendingCall::Proposal { .. }) => Some("AI sedang berpikir..."),
            Some(PendingCall::Validation { author, .. }) if author.is_machine() => {
                Some("AI sedang berpikir...")
            }
            Some(PendingCall::Validation { .. }) => Some("Memvalidasi..."),
            None => None,
        }
    }

    /// Headline on the game-over screen.
    pub fn winner_label(&self) -> String {
        match (*self.snapshot.mode(), self.snapshot.winner()) {
            (_, None) => String::new(),
            (Mode::VersusMachine, Some(PlayerId::Machine)) => "AI Menang!".to_string(),
            (Mode::VersusMachine, Some(_)) => "Kamu Menang!".to_string(),
            (_, Some(player)) => format!("{} Menang!", player),
        }
    }

    /// Explanation under the game-over headline.
    pub fn reason_label(&self) -> String {
        let Some(outcome) = self.snapshot.outcome() else {
            return String::new();
        };
        match outcome.reason {
            EndReason::Timeout => {
                let loser = self
                    .snapshot
                    .mode()
                    .opponent_of(outcome.winner)
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                format!("Waktu {} habis.", loser)
            }
            EndReason::Surrender => "AI menyerah, tidak menemukan kata.".to_string(),
            EndReason::MachineForfeit => "AI memberi kata yang tidak sah.".to_string(),
        }
    }
}
