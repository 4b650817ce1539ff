//! Configuration management for the agency backend.
//!
//! Configuration is read once at startup from environment variables. A `.env`
//! file in the working directory is loaded first when present; variables that
//! are already set in the process environment take precedence.
//!
//! - `OPENAI_API_KEY` - Required. Key for the chat-completions API.
//! - `OPENAI_BASE_URL` - Optional. Defaults to `https://api.openai.com/v1`.
//! - `DEFAULT_MODEL` - Optional. Defaults to `gpt-3.5-turbo`.
//! - `LLM_TIMEOUT_SECS` - Optional. Model request timeout. Defaults to `120`.
//! - `SERPER_API_KEY` - Optional. Search key; searches fail softly without it.
//! - `SERPER_URL` - Optional. Defaults to `https://google.serper.dev/search`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `5000`.
//! - `MAX_ROUND` - Optional. Conversation round cap. Defaults to `20`.
//! - `MAX_CONSECUTIVE_AUTO_REPLY` - Optional. Proxy reply cap. Defaults to `10`.
//! - `MAX_TOOL_ITERATIONS` - Optional. Model calls per turn while tools are requested. Defaults to `5`.
//! - `SPEAKER_SELECTION` - Optional. `round_robin` or `auto`. Defaults to `round_robin`.

use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SERPER_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// How the next speaker is chosen after each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeakerSelection {
    /// Cycle through the roster in order.
    #[default]
    RoundRobin,
    /// Ask the model which role should speak next.
    Auto,
}

impl FromStr for SpeakerSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "round_robin" | "round-robin" | "roundrobin" => Ok(Self::RoundRobin),
            "auto" => Ok(Self::Auto),
            other => Err(format!("expected 'round_robin' or 'auto', got: {}", other)),
        }
    }
}

/// Chat-completions API settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Search provider settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Serper API key. Searches return an error payload when unset.
    pub api_key: Option<String>,
    pub url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: DEFAULT_SERPER_URL.to_string(),
        }
    }
}

/// Limits applied to a single conversation run.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    pub max_round: usize,
    pub max_consecutive_auto_reply: usize,
    pub max_tool_iterations: usize,
    pub speaker_selection: SpeakerSelection,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_round: 20,
            max_consecutive_auto_reply: 10,
            max_tool_iterations: 5,
            speaker_selection: SpeakerSelection::RoundRobin,
        }
    }
}

/// Process-wide configuration, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub conversation: ConversationConfig,
}

impl Config {
    /// Load configuration from the environment, after merging `.env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENAI_API_KEY` is not set and
    /// `ConfigError::InvalidValue` for unparsable numbers or modes.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv(Path::new(".env"));

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let llm = LlmConfig {
            api_key,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            model: std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
        };

        let search = SearchConfig {
            api_key: std::env::var("SERPER_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            url: std::env::var("SERPER_URL").unwrap_or_else(|_| DEFAULT_SERPER_URL.to_string()),
        };

        let conversation = ConversationConfig {
            max_round: parse_env("MAX_ROUND", 20)?,
            max_consecutive_auto_reply: parse_env("MAX_CONSECUTIVE_AUTO_REPLY", 10)?,
            max_tool_iterations: parse_env("MAX_TOOL_ITERATIONS", 5)?,
            speaker_selection: parse_env("SPEAKER_SELECTION", SpeakerSelection::RoundRobin)?,
        };

        if conversation.max_round == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ROUND".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT", 5000)?,
            llm,
            search,
            conversation,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            llm: LlmConfig {
                api_key,
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                model,
                timeout_secs: 120,
            },
            search: SearchConfig::default(),
            conversation: ConversationConfig::default(),
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

/// Merge a dotenv file into the process environment.
///
/// Missing files are ignored. Existing variables are never overwritten.
pub fn load_dotenv(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Loaded dotenv file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable dotenv file"),
    }
}
