use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SahayakError};

/// Top-level configuration for the Sahayak service.
///
/// Loaded from `sahayak.toml` by default. Each section corresponds to one
/// subsystem or external collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SahayakConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub bhashini: BhashiniConfig,
    #[serde(default)]
    pub form: FormConfig,
}

impl SahayakConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SahayakConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SahayakError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
        }
    }
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle minutes before a session is considered expired.
    pub timeout_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { timeout_minutes: 30 }
    }
}

/// Ollama LLM extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub url: String,
    /// Model used for field extraction.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Bhashini speech pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BhashiniConfig {
    /// Pipeline inference endpoint.
    pub url: String,
    /// API key sent in the Authorization header. Empty means unauthenticated;
    /// set it in the config file or via deployment secrets.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BhashiniConfig {
    fn default() -> Self {
        Self {
            url: "https://dhruva-api.bhashini.gov.in/services/inference/pipeline".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Form automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Endpoint of the browser-automation bridge.
    pub bridge_url: String,
    /// Target scholarship eligibility form.
    pub form_url: String,
    /// Directory where the bridge writes screenshots.
    pub screenshots_dir: String,
    /// Maximum concurrent browser-automation invocations.
    pub max_concurrent_fills: usize,
    /// Per-fill timeout in seconds (browser steps use fixed explicit waits).
    pub fill_timeout_secs: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            bridge_url: "http://localhost:9515".to_string(),
            form_url: "https://scholarships.gov.in/scholarshipEligibility/".to_string(),
            screenshots_dir: "screenshots".to_string(),
            max_concurrent_fills: 2,
            fill_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = SahayakConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.session.timeout_minutes, 30);
        assert_eq!(config.ollama.url, "http://localhost:11434");
        assert_eq!(config.ollama.model, "llama3.2:3b");
        assert!(config.bhashini.api_key.is_empty());
        assert_eq!(config.form.max_concurrent_fills, 2);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[server]
host = "127.0.0.1"
port = 9000
log_level = "debug"

[session]
timeout_minutes = 5

[ollama]
url = "http://llm:11434"
model = "llama3.2:1b"
timeout_secs = 20

[form]
max_concurrent_fills = 4
"#;
        let file = create_temp_config(content);
        let config = SahayakConfig::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.session.timeout_minutes, 5);
        assert_eq!(config.ollama.model, "llama3.2:1b");
        assert_eq!(config.form.max_concurrent_fills, 4);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[session]
timeout_minutes = 120
"#;
        let file = create_temp_config(content);
        let config = SahayakConfig::load(file.path()).unwrap();
        assert_eq!(config.session.timeout_minutes, 120);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.ollama.model, "llama3.2:3b");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = SahayakConfig::load_or_default(Path::new("/nonexistent/sahayak.toml"));
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.session.timeout_minutes, 30);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        assert!(SahayakConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("sahayak.toml");

        let config = SahayakConfig::default();
        config.save(&path).unwrap();

        let reloaded = SahayakConfig::load(&path).unwrap();
        assert_eq!(reloaded.server.port, config.server.port);
        assert_eq!(reloaded.ollama.model, config.ollama.model);
        assert_eq!(reloaded.form.form_url, config.form.form_url);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = SahayakConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.form.fill_timeout_secs, 120);
    }
}
