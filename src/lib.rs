//! Sambung Kata - Indonesian word-chain game against an LLM
//!
//! Players alternate words, each starting with the last letter of the one
//! before it. Local chain rules live in [`sambung_rules`]; this crate adds the
//! LLM oracle that judges words and plays the machine's moves, the async
//! driver that owns a session, and a terminal front-end.
//!
//! # Architecture
//!
//! - **Oracle**: [`MoveOracle`] judges words and proposes machine moves
//!   ([`LlmOracle`] over Gemini, OpenAI or Anthropic; [`OfflineOracle`] without a key)
//! - **Driver**: [`SessionDriver`] serializes commands, ticks and oracle replies
//! - **TUI**: ratatui front-end with menu, game and game-over screens
//!
//! # Example
//!
//! ```no_run
//! use sambung_kata::{DriverSettings, OfflineOracle, SessionDriver};
//! use sambung_rules::{Mode, Theme};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let driver = SessionDriver::spawn(Arc::new(OfflineOracle), DriverSettings::default());
//! driver.start(Mode::LocalTwoPlayer, Theme::Animals)?;
//! driver.submit("kucing")?;
//! driver.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod driver;
mod game_config;
mod llm_client;
mod llm_oracle;
mod oracle;
pub mod tui;

pub use driver::{DriverCommand, DriverError, DriverHandle, DriverSettings, SessionDriver};
pub use game_config::{ConfigError, GameConfig};
pub use llm_client::{Completion, LlmClient, LlmConfig, LlmError, LlmProvider};
pub use llm_oracle::{
    LlmOracle, MoveReply, ValidationReply, move_prompt, parse_reply, system_prompt,
    validation_prompt,
};
pub use oracle::{MoveOracle, OfflineOracle, OracleError};
pub use tui::run_tui;
