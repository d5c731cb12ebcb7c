//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `PREDCULTURE_ARTIFACT_DIR` and `PREDCULTURE_LOG_LEVEL` env
//! overrides. The provider API key comes from `LLM_API_KEY` only — never TOML.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

/// Mistral chat-completions provider configuration.
/// Populated from `[llm.mistral]` in the TOML.
#[derive(Debug, Clone)]
pub struct MistralConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM subsystem configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (e.g. `"dummy"`, `"mistral"`).
    /// Maps to `default` in `[llm]` TOML — named `default` there to signal
    /// that other provider sections can coexist without being loaded.
    pub provider: String,
    /// Config for the Mistral provider (`[llm.mistral]`).
    pub mistral: MistralConfig,
}

/// Conversation defaults (`[chat]`).
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Synthetic assistant message every session opens with.
    pub greeting: String,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub log_level: String,
    /// Directory holding the fitted inference artifacts (already expanded, no `~`).
    pub artifact_dir: PathBuf,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    /// API key from `LLM_API_KEY` env var — `None` for the dummy provider.
    /// Never sourced from TOML.
    pub llm_api_key: Option<String>,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    service: RawService,
    #[serde(default)]
    inference: RawInference,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    chat: RawChat,
}

#[derive(Deserialize)]
struct RawService {
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawInference {
    #[serde(default = "default_artifact_dir")]
    artifact_dir: String,
}

impl Default for RawInference {
    fn default() -> Self {
        Self { artifact_dir: default_artifact_dir() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    mistral: RawMistralConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), mistral: RawMistralConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawMistralConfig {
    #[serde(default = "default_mistral_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_mistral_model")]
    model: String,
    #[serde(default = "default_mistral_temperature")]
    temperature: f32,
    #[serde(default = "default_mistral_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawMistralConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_mistral_api_base_url(),
            model: default_mistral_model(),
            temperature: default_mistral_temperature(),
            timeout_seconds: default_mistral_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawChat {
    #[serde(default = "default_greeting")]
    greeting: String,
}

impl Default for RawChat {
    fn default() -> Self {
        Self { greeting: default_greeting() }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_artifact_dir() -> String { "data/artifacts".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_mistral_api_base_url() -> String { "https://api.mistral.ai/v1/chat/completions".to_string() }
fn default_mistral_model() -> String { "mistral-tiny".to_string() }
fn default_mistral_temperature() -> f32 { 0.3 }
fn default_mistral_timeout_seconds() -> u64 { 30 }
fn default_greeting() -> String {
    "Bonjour ! Je suis votre assistant PRedCulture. Comment puis-je vous aider concernant le cancer du sein ?".to_string()
}

/// Load config, then apply env-var overrides.
///
/// `path` defaults to `config/default.toml` when `None`.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let artifact_dir_override = env::var("PREDCULTURE_ARTIFACT_DIR").ok();
    let log_level_override = env::var("PREDCULTURE_LOG_LEVEL").ok();
    load_from(
        Path::new(path.unwrap_or("config/default.toml")),
        artifact_dir_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    artifact_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let artifact_dir_str = artifact_dir_override
        .unwrap_or(&parsed.inference.artifact_dir)
        .to_string();
    let artifact_dir = expand_home(&artifact_dir_str);
    let log_level = log_level_override
        .unwrap_or(&parsed.service.log_level)
        .to_string();

    Ok(Config {
        service_name: parsed.service.name,
        log_level,
        artifact_dir,
        llm: LlmConfig {
            provider: parsed.llm.provider,
            mistral: MistralConfig {
                api_base_url: parsed.llm.mistral.api_base_url,
                model: parsed.llm.mistral.model,
                temperature: parsed.llm.mistral.temperature,
                timeout_seconds: parsed.llm.mistral.timeout_seconds,
            },
        },
        chat: ChatConfig {
            greeting: parsed.chat.greeting,
        },
        llm_api_key: env::var("LLM_API_KEY").ok(),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy LLM, no API keys, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default(artifact_dir: &Path) -> Self {
        Self {
            service_name: "test".into(),
            log_level: "info".into(),
            artifact_dir: artifact_dir.to_path_buf(),
            llm: LlmConfig {
                provider: "dummy".into(),
                mistral: MistralConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    timeout_seconds: 1,
                },
            },
            chat: ChatConfig {
                greeting: "hello from tests".into(),
            },
            llm_api_key: None,
        }
    }
}
