//! Application configuration.
//!
//! Loaded from a TOML file (`verbena.toml` beside the binary, or under the
//! platform config directory), with every key optional. The API key is
//! never stored in the file: it comes from `VERBENA_API_KEY` or
//! `OPENAI_API_KEY`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reasoning: ReasoningConfig,
    pub agent: AgentSection,
    pub suggestions: SuggestionsSection,
    pub sessions: SessionsSection,
    pub server: ServerSection,
}

/// Reasoning-backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// OpenAI-compatible endpoint base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

/// Turn-orchestrator settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub max_iterations: u32,
    pub history_window: usize,
    pub tool_timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            history_window: 20,
            tool_timeout_secs: 30,
            max_tokens: 1024,
        }
    }
}

/// Suggestion-engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestionsSection {
    pub limit: usize,
    pub min_score: f32,
    pub candidate_pool: usize,
}

impl Default for SuggestionsSection {
    fn default() -> Self {
        Self {
            limit: 5,
            min_score: 0.35,
            candidate_pool: 15,
        }
    }
}

/// Session-store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionsSection {
    pub max_sessions: usize,
    /// Zero disables idle eviction.
    pub idle_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for SessionsSection {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            idle_timeout_secs: 1800,
            cleanup_interval_secs: 60,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".parse().unwrap(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicitly given path must exist; otherwise `verbena.toml` in the
    /// working directory and the platform config directory are tried, and
    /// defaults apply when nothing is found.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => {
                anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
                Some(path.to_path_buf())
            }
            None => Self::discover(),
        };

        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let config: Self =
                    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
                tracing::debug!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from("verbena.toml");
        if local.exists() {
            return Some(local);
        }
        let in_config_dir = dirs::config_dir()?.join("verbena").join("verbena.toml");
        in_config_dir.exists().then_some(in_config_dir)
    }

    /// The API key from the environment, if set.
    pub fn api_key() -> Option<String> {
        std::env::var("VERBENA_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// Idle timeout as a duration, `None` when disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.sessions.idle_timeout_secs > 0)
            .then(|| Duration::from_secs(self.sessions.idle_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.agent.max_iterations, 6);
        assert_eq!(config.suggestions.limit, 5);
        assert_eq!(config.sessions.max_sessions, 10_000);
        assert_eq!(config.reasoning.model, "gpt-4o-mini");
        assert!(config.idle_timeout().is_some());
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[agent]\nmax_iterations = 3\n\n[sessions]\nidle_timeout_secs = 0\n"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.agent.max_iterations, 3);
        assert!(config.idle_timeout().is_none());
        // Untouched sections keep their defaults.
        assert_eq!(config.suggestions.candidate_pool, 15);
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/verbena.toml"))).is_err());
    }
}
