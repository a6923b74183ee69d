//! Configuration (env vars + optional `.env` + optional JSON config file).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PromptloopError, Result};

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that can use tools to get information and perform tasks.";

/// Flat LLM endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub organization: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout: Option<u64>,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: None,
            organization: None,
            timeout: Some(60),
            temperature: 0.7,
            max_tokens: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }
}

/// Agent-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub llm: LlmConfig,
    pub system_prompt: String,
    pub default_tools: Vec<String>,
    pub enable_reflection: bool,
    pub reflection_system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            default_tools: Vec::new(),
            enable_reflection: false,
            reflection_system_prompt: None,
        }
    }
}

/// Return the first environment variable in `names` that is set and non-empty.
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.is_empty())
}

impl AgentConfig {
    /// Build configuration from environment variables, loading `.env` first
    /// when present.
    ///
    /// API key resolution order: `LLM_API_KEY` > `OPENAI_API_KEY` >
    /// `DEEPSEEK_API_KEY` > `ANTHROPIC_API_KEY` > `AZURE_OPENAI_API_KEY`.
    /// Base URL resolution order mirrors the same providers. When the base
    /// URL names a known provider and `LLM_MODEL` is unset, that provider's
    /// default model is used.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let mut config = Self::default();

        if let Some(key) = first_env(&[
            "LLM_API_KEY",
            "OPENAI_API_KEY",
            "DEEPSEEK_API_KEY",
            "ANTHROPIC_API_KEY",
            "AZURE_OPENAI_API_KEY",
        ]) {
            config.llm.api_key = Some(key);
        }

        if let Some(base) = first_env(&[
            "LLM_API_BASE",
            "OPENAI_API_BASE",
            "DEEPSEEK_API_BASE",
            "ANTHROPIC_API_BASE",
            "AZURE_OPENAI_ENDPOINT",
        ]) {
            config.llm.api_base = Some(base);
        }

        if let Some(org) = first_env(&["LLM_ORGANIZATION", "OPENAI_ORGANIZATION"]) {
            config.llm.organization = Some(org);
        }

        let explicit_model = first_env(&["LLM_MODEL"]);
        if let Some(ref model) = explicit_model {
            config.llm.model = model.clone();
        }

        // Infer a provider-appropriate default model from the base URL.
        if explicit_model.is_none() {
            if let Some(ref base) = config.llm.api_base {
                let base = base.to_lowercase();
                if base.contains("deepseek") {
                    config.llm.model = "deepseek-chat".to_string();
                } else if base.contains("anthropic") {
                    config.llm.model = "claude-3-sonnet-20240229".to_string();
                } else if base.contains("azure") {
                    // Azure routes by deployment name instead of model name.
                    if let Some(deployment) = first_env(&["AZURE_OPENAI_DEPLOYMENT_NAME"]) {
                        config.llm.model = deployment;
                    }
                }
            }
        }

        config
    }

    /// Load configuration from a JSON file, overlaying values onto the
    /// environment-derived config. Keys absent from the file keep their
    /// current values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_env();
        config.overlay_file(path.as_ref())?;
        Ok(config)
    }

    fn overlay_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)?;
        let overlay: ConfigOverlay = serde_json::from_str(&raw).map_err(|e| {
            PromptloopError::Configuration(format!(
                "invalid config file {}: {e}",
                path.display()
            ))
        })?;

        if let Some(llm) = overlay.llm {
            if let Some(v) = llm.model {
                self.llm.model = v;
            }
            if let Some(v) = llm.api_key {
                self.llm.api_key = Some(v);
            }
            if let Some(v) = llm.api_base {
                self.llm.api_base = Some(v);
            }
            if let Some(v) = llm.organization {
                self.llm.organization = Some(v);
            }
            if let Some(v) = llm.timeout {
                self.llm.timeout = Some(v);
            }
            if let Some(v) = llm.temperature {
                self.llm.temperature = v;
            }
            if let Some(v) = llm.max_tokens {
                self.llm.max_tokens = Some(v);
            }
            if let Some(v) = llm.top_p {
                self.llm.top_p = Some(v);
            }
            if let Some(v) = llm.frequency_penalty {
                self.llm.frequency_penalty = Some(v);
            }
            if let Some(v) = llm.presence_penalty {
                self.llm.presence_penalty = Some(v);
            }
        }
        if let Some(v) = overlay.system_prompt {
            self.system_prompt = v;
        }
        if let Some(v) = overlay.default_tools {
            self.default_tools = v;
        }
        if let Some(v) = overlay.enable_reflection {
            self.enable_reflection = v;
        }
        if let Some(v) = overlay.reflection_system_prompt {
            self.reflection_system_prompt = Some(v);
        }

        info!(path = %path.display(), "configuration loaded");
        Ok(())
    }

    /// Save the configuration as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

/// Partial mirror of [`AgentConfig`] used for file overlays.
#[derive(Debug, Default, Deserialize)]
struct ConfigOverlay {
    llm: Option<LlmOverlay>,
    system_prompt: Option<String>,
    default_tools: Option<Vec<String>>,
    enable_reflection: Option<bool>,
    reflection_system_prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmOverlay {
    model: Option<String>,
    api_key: Option<String>,
    api_base: Option<String>,
    organization: Option<String>,
    timeout: Option<u64>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    top_p: Option<f64>,
    frequency_penalty: Option<f64>,
    presence_penalty: Option<f64>,
}
