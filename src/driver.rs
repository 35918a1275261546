//! Async runtime around the session state machine.
//!
//! A single task owns the [`GameSession`]. Commands, one-second ticks and
//! oracle replies are funnelled into it as events; effects become spawned
//! oracle calls whose answers come back on an internal channel.

use crate::game_config::GameConfig;
use crate::oracle::{MoveOracle, OracleError};
use derive_more::{Display, Error};
use sambung_rules::{
    Effect, GameSession, Mode, PlayerId, Resolution, SessionEvent, SessionState, Step, Theme,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{Instrument, debug, info, info_span, instrument, warn};

/// Requests from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCommand {
    /// Start (or restart) a session.
    Start {
        /// Participants.
        mode: Mode,
        /// Session topic.
        theme: Theme,
    },
    /// The active human submits a word.
    Submit(String),
    /// Abandon the session.
    ReturnToMenu,
    /// Stop the driver.
    Quit,
}

/// Timing knobs for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct DriverSettings {
    /// Seconds per turn.
    pub turn_secs: u32,
    /// Clock resolution.
    pub tick: Duration,
    /// Pause before a machine move is requested.
    pub thinking_delay: Duration,
    /// Upper bound on one oracle call.
    pub oracle_timeout: Duration,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

impl From<&GameConfig> for DriverSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            turn_secs: *config.turn_secs(),
            tick: Duration::from_secs(1),
            thinking_delay: config.thinking_delay(),
            oracle_timeout: config.oracle_timeout(),
        }
    }
}

/// Owns a session and serializes every change to it.
pub struct SessionDriver {
    session: GameSession,
    oracle: Arc<dyn MoveOracle>,
    settings: DriverSettings,
    snapshots: watch::Sender<SessionState>,
    resolved_tx: mpsc::UnboundedSender<SessionEvent>,
    resolved_rx: mpsc::UnboundedReceiver<SessionEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl SessionDriver {
    /// Spawns a driver on the current tokio runtime.
    #[instrument(skip(oracle), fields(oracle = %oracle.name()))]
    pub fn spawn(oracle: Arc<dyn MoveOracle>, settings: DriverSettings) -> DriverHandle {
        let session = GameSession::new(settings.turn_secs);
        let (snapshots, snapshot_rx) = watch::channel(session.state().clone());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (resolved_tx, resolved_rx) = mpsc::unbounded_channel();

        let driver = Self {
            session,
            oracle,
            settings,
            snapshots,
            resolved_tx,
            resolved_rx,
            in_flight: None,
        };
        let task = tokio::spawn(driver.run(command_rx).instrument(info_span!("session_driver")));

        info!("Session driver started");
        DriverHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<DriverCommand>) {
        let tick = self.settings.tick;
        let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                command = commands.recv() => match command {
                    Some(DriverCommand::Start { mode, theme }) => {
                        SessionEvent::StartGame { mode, theme }
                    }
                    Some(DriverCommand::Submit(word)) => SessionEvent::Submit { word },
                    Some(DriverCommand::ReturnToMenu) => SessionEvent::ReturnToMenu,
                    Some(DriverCommand::Quit) | None => break,
                },
                Some(event) = self.resolved_rx.recv() => event,
                _ = ticker.tick() => SessionEvent::Tick,
            };

            let before = self.clock_context();
            self.dispatch(event);
            if self.clock_context() != before {
                // A fresh turn or a finished call gets a full second first.
                ticker.reset();
            }
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        info!("Session driver stopped");
    }

    fn clock_context(&self) -> (u64, usize, PlayerId, bool) {
        let state = self.session.state();
        (
            self.session.epoch(),
            state.streak(),
            *state.active(),
            state.is_waiting(),
        )
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let epoch = self.session.epoch();
        let Step { session, effects } = std::mem::take(&mut self.session).apply(event);
        self.session = session;

        if self.session.epoch() != epoch
            && let Some(task) = self.in_flight.take()
        {
            debug!("Abandoning superseded oracle call");
            task.abort();
        }

        for effect in effects {
            self.execute(effect);
        }

        let state = self.session.state();
        self.snapshots.send_if_modified(|current| {
            if current == state {
                false
            } else {
                *current = state.clone();
                true
            }
        });
    }

    fn execute(&mut self, effect: Effect) {
        let oracle = Arc::clone(&self.oracle);
        let resolved = self.resolved_tx.clone();
        let timeout = self.settings.oracle_timeout;
        let ticket = effect.ticket();

        let task = match effect {
            Effect::Validate { ticket, word, theme } => tokio::spawn(
                async move {
                    let outcome = call_oracle(timeout, oracle.validate(&word, theme)).await;
                    let _ = resolved.send(SessionEvent::ValidationResolved { ticket, outcome });
                }
                .instrument(info_span!("validate", %ticket)),
            ),
            Effect::Propose {
                ticket,
                history,
                last_word,
                theme,
            } => {
                let delay = self.settings.thinking_delay;
                tokio::spawn(
                    async move {
                        tokio::time::sleep(delay).await;
                        let outcome = call_oracle(
                            timeout,
                            oracle.propose_move(&history, last_word.as_deref(), theme),
                        )
                        .await;
                        let _ = resolved.send(SessionEvent::ProposalResolved { ticket, outcome });
                    }
                    .instrument(info_span!("propose", %ticket)),
                )
            }
        };

        debug!(%ticket, "Oracle call spawned");
        self.in_flight = Some(task);
    }
}

async fn call_oracle<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, OracleError>>,
) -> Resolution<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(answer)) => Resolution::Answered(answer),
        Ok(Err(e)) => {
            warn!(error = %e, "Oracle call failed");
            Resolution::Unavailable(e.message)
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "Oracle call timed out");
            Resolution::Unavailable(format!("oracle timed out after {:?}", timeout))
        }
    }
}

/// Client side of a running [`SessionDriver`].
#[derive(Debug)]
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<DriverCommand>,
    snapshots: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Sends a command to the driver.
    #[instrument(skip(self))]
    pub fn send(&self, command: DriverCommand) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .map_err(|_| DriverError::new("session driver has stopped".to_string()))
    }

    /// Starts a session.
    pub fn start(&self, mode: Mode, theme: Theme) -> Result<(), DriverError> {
        self.send(DriverCommand::Start { mode, theme })
    }

    /// Submits a word for the active human.
    pub fn submit(&self, word: impl Into<String>) -> Result<(), DriverError> {
        self.send(DriverCommand::Submit(word.into()))
    }

    /// Abandons the session.
    pub fn return_to_menu(&self) -> Result<(), DriverError> {
        self.send(DriverCommand::ReturnToMenu)
    }

    /// Latest published snapshot.
    pub fn state(&self) -> SessionState {
        self.snapshots.borrow().clone()
    }

    /// A receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.snapshots.clone()
    }

    /// Stops the driver and waits for it to finish.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        let _ = self.commands.send(DriverCommand::Quit);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Session driver task failed");
        }
    }
}

/// Driver communication error.
#[derive(Debug, Clone, Display, Error)]
#[display("Driver error: {} at {}:{}", message, file, line)]
pub struct DriverError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DriverError {
    /// Creates a new driver error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
