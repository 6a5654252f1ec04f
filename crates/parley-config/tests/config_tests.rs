// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Parley configuration system.

use parley_config::diagnostic::{ConfigError, suggest_key};
use parley_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_parley_config() {
    let toml = r#"
[agent]
name = "test-agent"
log_level = "debug"

[openai]
api_key = "sk-test-123"
model = "gpt-4.1-nano"
embedding_model = "text-embedding-3-small"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[telegram]
bot_token = "123:ABC"
allowed_users = ["alice", "bob"]

[gateway]
host = "0.0.0.0"
port = 9000

[memory]
max_history_tokens = 2000
max_qa_tokens = 500
top_k = 3
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "test-agent");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test-123"));
    assert_eq!(config.openai.model, "gpt-4.1-nano");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.allowed_users, vec!["alice", "bob"]);
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.memory.max_history_tokens, 2000);
    assert_eq!(config.memory.max_qa_tokens, 500);
    assert_eq!(config.memory.top_k, 3);
}

/// Unknown field in [openai] section produces an error.
#[test]
fn unknown_field_in_openai_produces_error() {
    let toml = r#"
[openai]
modle = "gpt-4.1-nano"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("modle"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown field in [telegram] section produces an error.
#[test]
fn unknown_field_in_telegram_produces_error() {
    let toml = r#"
[telegram]
bot_tken = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bot_tken"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = "";
    let config = load_config_from_str(toml).expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "parley");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.agent.system_prompt.contains("QA assistant"));
    assert!(config.openai.api_key.is_none());
    assert_eq!(config.openai.model, "gpt-4.1-nano");
    assert_eq!(config.openai.embedding_model, "text-embedding-3-small");
    assert_eq!(config.openai.api_base, "https://api.openai.com/v1");
    assert!(config.storage.wal_mode);
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.allowed_users.is_empty());
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 8000);
    assert!(config.gateway.bearer_token.is_none());
    assert!(config.memory.enabled);
    assert_eq!(config.memory.max_history_tokens, 1200);
    assert_eq!(config.memory.max_qa_tokens, 800);
    assert_eq!(config.memory.top_k, 5);
    assert!(config.webhook.url.is_none());
}

/// load_and_validate_str surfaces validation errors as diagnostics.
#[test]
fn validation_errors_surface_as_diagnostics() {
    let toml = r#"
[memory]
top_k = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("top_k"))));
}

/// Typo suggestions come from Jaro-Winkler matching over section keys.
#[test]
fn typo_suggestion_for_embedding_model() {
    let valid = &["api_key", "model", "embedding_model", "api_base"];
    assert_eq!(
        suggest_key("embeding_model", valid),
        Some("embedding_model".to_string())
    );
}

/// Environment variable override maps PARLEY_OPENAI_API_KEY to openai.api_key.
#[test]
fn env_var_mapping_preserves_underscored_keys() {
    use figment::{
        Figment, Jail,
        providers::{Env, Serialized},
    };
    use parley_config::ParleyConfig;

    Jail::expect_with(|jail| {
        jail.set_env("PARLEY_OPENAI_API_KEY", "sk-from-env");
        jail.set_env("PARLEY_TELEGRAM_BOT_TOKEN", "999:XYZ");

        let config: ParleyConfig = Figment::new()
            .merge(Serialized::defaults(ParleyConfig::default()))
            .merge(Env::prefixed("PARLEY_").map(|key| {
                let key_str = key.as_str();
                key_str
                    .replacen("openai_", "openai.", 1)
                    .replacen("telegram_", "telegram.", 1)
                    .into()
            }))
            .extract()
            .expect("env config should extract");

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-from-env"));
        assert_eq!(config.telegram.bot_token.as_deref(), Some("999:XYZ"));
        Ok(())
    });
}
