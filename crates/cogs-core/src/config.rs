//! Agent configuration
//!
//! Config is loaded with a three-layer resolution:
//! 1. Explicit path (`--config`), or the override in the data dir
//!    (~/.local/share/cogs-agent/config/agent.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//! 3. Environment variables override whatever the file says

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::context::DEFAULT_DAILY_SAMPLE_DAYS;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/agent.toml");

pub const ENV_DATA_DIR: &str = "COGS_DATA_DIR";
pub const ENV_HOST: &str = "OPENAI_COMPATIBLE_HOST";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Dataset directory
    pub data_dir: PathBuf,
    /// Chat-completions server root
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Bearer credential (empty when unset; never validated)
    pub api_key: String,
    /// Trailing days of the daily series sampled into the agent context
    pub daily_sample_days: usize,
    /// File the settings were read from (None for embedded defaults)
    pub source: Option<PathBuf>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            api_key: String::new(),
            daily_sample_days: DEFAULT_DAILY_SAMPLE_DAYS,
            source: None,
        }
    }
}

impl AgentConfig {
    /// Load configuration (explicit path, then override, then embedded) and apply env vars
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_file(explicit)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from files only, ignoring the environment
    pub fn load_file(explicit: Option<&Path>) -> Result<Self> {
        let (content, source) = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::NotFound(format!("config file {}", path.display())));
                }
                (read_config(path)?, Some(path.to_path_buf()))
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => (read_config(&path)?, Some(path)),
                None => (DEFAULT_CONFIG.to_string(), None),
            },
        };

        let mut config = parse_config(&content)?;
        config.source = source;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup(ENV_HOST).filter(|v| !v.is_empty()) {
            self.base_url = host.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.model = model;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = key;
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cogs-agent").join("config").join("agent.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::InvalidData(format!("Failed to read config {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    data: Option<RawData>,
    agent: Option<RawAgent>,
    context: Option<RawContext>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAgent {
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawContext {
    daily_sample_days: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AgentConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = AgentConfig::default();

    if let Some(data) = raw.data {
        if let Some(dir) = data.dir {
            config.data_dir = PathBuf::from(dir);
        }
    }

    if let Some(agent) = raw.agent {
        if let Some(base_url) = agent.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = agent.model {
            config.model = model;
        }
        if let Some(temperature) = agent.temperature {
            config.temperature = temperature;
        }
    }

    if let Some(context) = raw.context {
        if let Some(days) = context.daily_sample_days {
            config.daily_sample_days = days;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.base_url, "https://api.openai.com");
        assert_eq!(config.model, "gpt-4o-mini");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.daily_sample_days, 21);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config("[agent]\nmodel = \"local-llama\"\n").unwrap();
        assert_eq!(config.model, "local-llama");
        assert_eq!(config.base_url, "https://api.openai.com");
        assert_eq!(config.daily_sample_days, 21);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            parse_config("[agent\nmodel = 1"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.toml");
        fs::write(
            &path,
            "[agent]\nbase_url = \"http://localhost:8080/\"\n[context]\ndaily_sample_days = 7\n",
        )
        .unwrap();

        let config = AgentConfig::load_file(Some(&path)).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.daily_sample_days, 7);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));

        let missing = AgentConfig::load_file(Some(&dir.path().join("nope.toml")));
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_DIR, "/srv/cogs"),
            (ENV_HOST, "http://127.0.0.1:9000/"),
            (ENV_MODEL, ""),
            (ENV_API_KEY, "sk-test"),
        ]
        .into_iter()
        .collect();

        let mut config = AgentConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/srv/cogs"));
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        // Empty values do not clobber the model
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key, "sk-test");
    }
}
