//! Config loading tests.

use sambung_kata::{GameConfig, LlmProvider};
use sambung_rules::Theme;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_full_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
llm_provider = "anthropic"
llm_model = "claude-3-5-sonnet-20241022"
llm_max_tokens = 512
turn_secs = 45
thinking_delay_ms = 500
oracle_timeout_secs = 5
theme = "fruits-vegetables"
"#
    )
    .expect("write");

    let config = GameConfig::from_file(file.path()).expect("load");
    assert_eq!(config.llm_provider(), &LlmProvider::Anthropic);
    assert_eq!(config.model_name(), "claude-3-5-sonnet-20241022");
    assert_eq!(config.llm_max_tokens(), &512);
    assert_eq!(config.turn_secs(), &45);
    assert_eq!(config.thinking_delay(), Duration::from_millis(500));
    assert_eq!(config.oracle_timeout(), Duration::from_secs(5));
    assert_eq!(config.theme(), &Theme::FruitsVegetables);
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = GameConfig::from_file(file.path()).expect("load");
    assert_eq!(config, GameConfig::default());
    assert_eq!(config.llm_provider(), &LlmProvider::Gemini);
    assert_eq!(config.model_name(), "gemini-2.5-flash");
    assert_eq!(config.llm_max_tokens(), &1024);
    assert_eq!(config.turn_secs(), &30);
    assert_eq!(config.thinking_delay(), Duration::from_millis(1500));
    assert_eq!(config.oracle_timeout(), Duration::from_secs(20));
}

#[test]
fn test_zero_turn_secs_rejected() {
    let err = GameConfig::from_toml("turn_secs = 0").expect_err("zero turn");
    assert!(err.message.contains("turn_secs"));
}

#[test]
fn test_unknown_theme_rejected() {
    assert!(GameConfig::from_toml(r#"theme = "cars""#).is_err());
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = GameConfig::from_file(dir.path().join("nope.toml")).expect_err("missing");
    assert!(err.message.starts_with("Failed to read config file"));
}

#[test]
fn test_load_without_path_is_default() {
    let config = GameConfig::load(None).expect("defaults");
    assert_eq!(config.with_theme(Theme::Jobs).theme(), &Theme::Jobs);
}
