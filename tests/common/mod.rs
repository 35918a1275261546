//! Shared test doubles.

use sambung_kata::{MoveOracle, OracleError};
use sambung_rules::{MoveRecord, Proposal, Theme, Verdict};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted oracle answer.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// Answer after an optional delay.
    Answer(T, Duration),
    /// Fail immediately.
    Fail(String),
    /// Never answer.
    Hang,
}

/// Oracle that replays queued answers.
///
/// Validation defaults to accepting; proposals default to surrender.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    verdicts: Mutex<VecDeque<Reply<Verdict>>>,
    proposals: Mutex<VecDeque<Reply<Proposal>>>,
    validations: AtomicUsize,
    proposals_made: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verdict(self, reply: Reply<Verdict>) -> Self {
        self.verdicts.lock().expect("lock").push_back(reply);
        self
    }

    pub fn proposal(self, reply: Reply<Proposal>) -> Self {
        self.proposals.lock().expect("lock").push_back(reply);
        self
    }

    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }

    pub fn proposals_made(&self) -> usize {
        self.proposals_made.load(Ordering::SeqCst)
    }
}

async fn play_out<T>(reply: Reply<T>) -> Result<T, OracleError> {
    match reply {
        Reply::Answer(value, delay) => {
            tokio::time::sleep(delay).await;
            Ok(value)
        }
        Reply::Fail(message) => Err(OracleError::new(message)),
        Reply::Hang => std::future::pending().await,
    }
}

#[async_trait::async_trait]
impl MoveOracle for ScriptedOracle {
    async fn validate(&self, word: &str, _theme: Theme) -> Result<Verdict, OracleError> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        let next = self.verdicts.lock().expect("lock").pop_front();
        match next {
            Some(reply) => play_out(reply).await,
            None => Ok(Verdict::accept(format!("{} baku", word))),
        }
    }

    async fn propose_move(
        &self,
        _history: &[MoveRecord],
        _last_word: Option<&str>,
        _theme: Theme,
    ) -> Result<Proposal, OracleError> {
        self.proposals_made.fetch_add(1, Ordering::SeqCst);
        let next = self.proposals.lock().expect("lock").pop_front();
        match next {
            Some(reply) => play_out(reply).await,
            None => Ok(Proposal::surrender()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Accepting answer with no delay.
pub fn ok<T>(value: T) -> Reply<T> {
    Reply::Answer(value, Duration::ZERO)
}
