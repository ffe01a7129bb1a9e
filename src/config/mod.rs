use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Instructions given to the remote assistant. The assistant is pinned to
/// open-source intelligence work and must cite its sources rather than answer
/// from its own knowledge.
pub const DEFAULT_INSTRUCTIONS: &str = "You are an analyst specializing in open-source intelligence. \
Your role is to gather and analyze publicly available information for market research and competitive analysis. \
You will provide insights, trends, and data-driven answers. \
Never use your own knowledge to answer questions. \
Always include the relevant urls for the sources you got the data from.";

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Settings for the remote assistant-conversation service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantSettings {
    /// Model used for every run
    #[serde(default = "default_model")]
    pub model: String,
    /// System instructions registered with the assistant at startup
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Environment variable containing the API key
    #[serde(default = "default_assistant_key_env")]
    pub api_key_env: String,
    /// Custom base URL (for proxied endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Run polling behavior
    #[serde(default)]
    pub poll: PollSettings,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            instructions: default_instructions(),
            api_key_env: default_assistant_key_env(),
            base_url: None,
            poll: PollSettings::default(),
        }
    }
}

fn default_model() -> String {
    "gpt-4-1106-preview".to_string()
}

fn default_instructions() -> String {
    DEFAULT_INSTRUCTIONS.to_string()
}

fn default_assistant_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Polling behavior while waiting for a remote run to settle.
///
/// The wait starts at `interval_ms`, backs off exponentially up to
/// `max_interval_ms`, and gives up after `deadline_secs`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollSettings {
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,
    #[serde(default = "default_poll_max_interval")]
    pub max_interval_ms: u64,
    #[serde(default = "default_poll_deadline")]
    pub deadline_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            max_interval_ms: default_poll_max_interval(),
            deadline_secs: default_poll_deadline(),
        }
    }
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_poll_max_interval() -> u64 {
    5000
}

fn default_poll_deadline() -> u64 {
    120
}

/// Settings for the web-search service backing the assistant's search tool.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSettings {
    /// Environment variable containing the API key
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
    /// Custom base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Search depth requested from the backend ("basic" or "advanced")
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
    /// Approximate token budget for the returned context blob
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            base_url: None,
            search_depth: default_search_depth(),
            max_context_tokens: default_max_context_tokens(),
        }
    }
}

fn default_search_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

fn default_max_context_tokens() -> u32 {
    8000
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(cli.config.clone()).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        // Apply CLI overrides (CLI > env vars > config file)
        settings.apply_cli_overrides(cli);

        settings.validate()?;

        Ok(settings)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(model) = &cli.model {
            self.assistant.model = model.clone();
        }
        if let Some(deadline) = cli.poll_deadline {
            self.assistant.poll.deadline_secs = deadline;
        }
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = std::path::Path::new(root).join("argus");
        let s = Config::builder()
            .add_source(File::from(config_path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        let mut errors: Vec<String> = Vec::new();

        if self.assistant.model.trim().is_empty() {
            errors.push("assistant.model must not be empty".to_string());
        }
        if self.assistant.poll.interval_ms == 0 {
            errors.push("assistant.poll.interval_ms must be greater than zero".to_string());
        }
        if self.assistant.poll.max_interval_ms < self.assistant.poll.interval_ms {
            errors.push(
                "assistant.poll.max_interval_ms must not be below assistant.poll.interval_ms"
                    .to_string(),
            );
        }
        if self.assistant.poll.deadline_secs == 0 {
            errors.push("assistant.poll.deadline_secs must be greater than zero".to_string());
        }
        if !matches!(self.search.search_depth.as_str(), "basic" | "advanced") {
            errors.push(format!(
                "search.search_depth must be \"basic\" or \"advanced\", got \"{}\"",
                self.search.search_depth
            ));
        }
        if self.search.max_context_tokens == 0 {
            errors.push("search.max_context_tokens must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            ))
        }
    }
}
