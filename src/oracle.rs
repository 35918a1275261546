//! Move oracle trait and the offline fallback.

use derive_more::{Display, Error};
use sambung_rules::{MoveRecord, Proposal, Theme, Verdict};
use tracing::{debug, error, instrument};

/// External judge of words and source of machine moves.
#[async_trait::async_trait]
pub trait MoveOracle: Send + Sync {
    /// Judges whether `word` is a standard word and fits `theme`.
    async fn validate(&self, word: &str, theme: Theme) -> Result<Verdict, OracleError>;

    /// Proposes the machine's next word, or surrender.
    ///
    /// `history` is the whole chain so far; a proposal must not repeat any
    /// of it.
    async fn propose_move(
        &self,
        history: &[MoveRecord],
        last_word: Option<&str>,
        theme: Theme,
    ) -> Result<Proposal, OracleError>;

    /// Returns the oracle's display name.
    fn name(&self) -> &str;
}

/// Oracle used when no LLM is configured.
///
/// Every word is reported unreachable, so validation fails open, and the
/// machine always gives up.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

#[async_trait::async_trait]
impl MoveOracle for OfflineOracle {
    #[instrument(skip(self))]
    async fn validate(&self, word: &str, _theme: Theme) -> Result<Verdict, OracleError> {
        debug!("No oracle configured");
        Err(OracleError::new("no oracle configured".to_string()))
    }

    #[instrument(skip(self, history), fields(moves = history.len()))]
    async fn propose_move(
        &self,
        history: &[MoveRecord],
        _last_word: Option<&str>,
        _theme: Theme,
    ) -> Result<Proposal, OracleError> {
        debug!("Offline machine surrenders");
        Ok(Proposal::surrender())
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Oracle call error.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Oracle error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<crate::llm_client::LlmError> for OracleError {
    #[track_caller]
    fn from(err: crate::llm_client::LlmError) -> Self {
        OracleError::new(err.message)
    }
}
