//! Move oracle backed by an LLM.
//!
//! Prompts are written in Indonesian and ask for a single JSON object whose
//! schema is embedded in the system prompt.

use crate::game_config::{ConfigError, GameConfig};
use crate::llm_client::{Completion, LlmClient};
use crate::oracle::{MoveOracle, OracleError};
use sambung_rules::{MoveRecord, Proposal, Theme, Verdict, last_letter, normalize};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

const MOVE_TEMPERATURE: f32 = 0.7;

/// Reply shape for a validation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReply {
    /// Benar jika kata tersebut valid dan baku dalam Bahasa Indonesia.
    pub is_valid: bool,
    /// Benar jika kata tersebut sesuai dengan tema yang diminta. Jika tema Bebas, set true.
    pub fits_theme: bool,
    /// Penjelasan singkat.
    pub message: String,
}

impl From<ValidationReply> for Verdict {
    fn from(reply: ValidationReply) -> Self {
        Verdict {
            is_valid: reply.is_valid,
            fits_theme: reply.fits_theme,
            explanation: reply.message,
        }
    }
}

/// Reply shape for a move request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MoveReply {
    /// Kata balasan kamu.
    #[serde(default)]
    pub word: String,
    /// Set true jika tidak menemukan kata.
    #[serde(default)]
    pub surrender: bool,
}

impl From<MoveReply> for Proposal {
    fn from(reply: MoveReply) -> Self {
        let word = normalize(&reply.word);
        if reply.surrender || word.is_empty() {
            Proposal::surrender()
        } else {
            Proposal::play(word)
        }
    }
}

/// LLM-backed [`MoveOracle`].
#[derive(Debug, Clone)]
pub struct LlmOracle {
    client: LlmClient,
    name: String,
}

impl LlmOracle {
    /// Wraps an LLM client.
    pub fn new(client: LlmClient) -> Self {
        let name = format!(
            "{}:{}",
            client.config().provider(),
            client.config().model()
        );
        Self { client, name }
    }

    /// Builds an oracle from the config; fails when the API key is missing.
    #[instrument(skip(config), fields(provider = %config.llm_provider()))]
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        let llm_config = config.create_llm_config()?;
        Ok(Self::new(LlmClient::new(llm_config)))
    }

    async fn ask<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_message: &str,
        temperature: Option<f32>,
    ) -> Result<T, OracleError> {
        let raw = self
            .client
            .complete(&Completion::new(
                system_prompt,
                user_message,
                true,
                temperature,
            ))
            .await?;
        parse_reply(&raw)
    }
}

#[async_trait::async_trait]
impl MoveOracle for LlmOracle {
    #[instrument(skip(self), fields(oracle = %self.name))]
    async fn validate(&self, word: &str, theme: Theme) -> Result<Verdict, OracleError> {
        let reply: ValidationReply = self
            .ask(
                &system_prompt::<ValidationReply>(),
                &validation_prompt(word, theme),
                None,
            )
            .await?;
        info!(
            is_valid = reply.is_valid,
            fits_theme = reply.fits_theme,
            "Word judged"
        );
        Ok(reply.into())
    }

    #[instrument(skip(self, history), fields(oracle = %self.name, moves = history.len()))]
    async fn propose_move(
        &self,
        history: &[MoveRecord],
        last_word: Option<&str>,
        theme: Theme,
    ) -> Result<Proposal, OracleError> {
        let reply: MoveReply = self
            .ask(
                &system_prompt::<MoveReply>(),
                &move_prompt(history, last_word, theme),
                Some(MOVE_TEMPERATURE),
            )
            .await?;
        let proposal = Proposal::from(reply);
        info!(word = %proposal.word, surrender = proposal.surrender, "Move proposed");
        Ok(proposal)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// System prompt asking for a JSON object matching `T`'s schema.
pub fn system_prompt<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    let schema_json = serde_json::to_string_pretty(&schema).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to render reply schema");
        String::from("{}")
    });
    format!(
        "Kamu adalah wasit dan pemain permainan sambung kata Bahasa Indonesia.\n\
         Jawab HANYA dengan satu objek JSON yang sesuai dengan JSON Schema berikut, \
         tanpa teks lain:\n{}",
        schema_json
    )
}

fn theme_context(theme: Theme) -> String {
    if theme.is_open() {
        "Tema adalah 'BEBAS', jadi semua kata benda/kerja/sifat valid asalkan baku.".to_string()
    } else {
        format!(
            "Tema adalah '{}'. Kata HARUS berhubungan erat dengan kategori ini.",
            theme
        )
    }
}

fn theme_instruction(theme: Theme) -> String {
    if theme.is_open() {
        "Bebas (kata apa saja yang valid)".to_string()
    } else {
        format!("Sesuai tema '{}'", theme)
    }
}

/// User message for a validation request.
pub fn validation_prompt(word: &str, theme: Theme) -> String {
    format!(
        "Validasi kata \"{}\" dalam Bahasa Indonesia.\n\
         1. Apakah kata ini ada di KBBI (Kamus Besar Bahasa Indonesia) dan baku?\n\
         2. {}\n\n\
         Jawab dengan JSON.",
        word,
        theme_context(theme)
    )
}

/// User message for a move request.
pub fn move_prompt(history: &[MoveRecord], last_word: Option<&str>, theme: Theme) -> String {
    let Some(last_word) = last_word else {
        return format!(
            "Mulai permainan sambung kata Bahasa Indonesia. Tema: {}. Jawab JSON.",
            theme_instruction(theme)
        );
    };

    let used = history
        .iter()
        .map(|record| record.word().as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let letter = last_letter(last_word).map(String::from).unwrap_or_default();

    format!(
        "Kita bermain sambung kata. Kata terakhir: \"{}\".\n\
         Cari satu kata Bahasa Indonesia yang dimulai huruf \"{}\".\n\
         Tema: {}.\n\
         Kata yang SUDAH digunakan: [{}].\n\
         JANGAN gunakan kata yang sudah digunakan.\n\
         Jika menyerah, set surrender true. Format JSON.",
        last_word,
        letter,
        theme_instruction(theme),
        used
    )
}

/// Parses a JSON reply, tolerating code fences and surrounding prose.
#[instrument(skip(raw), fields(len = raw.len()))]
pub fn parse_reply<T: DeserializeOwned>(raw: &str) -> Result<T, OracleError> {
    let trimmed = strip_fences(raw.trim());
    let body = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };
    debug!(body, "Parsing oracle reply");
    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, raw, "Unparseable oracle reply");
        OracleError::new(format!("Failed to parse oracle reply: {}", e))
    })
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
