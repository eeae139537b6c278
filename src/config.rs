//! Configuration loading for blocksmith
//!
//! A single JSON configuration file holds the schema/definition
//! directories and the host platform connection settings. The engine
//! itself is read-only over those directories at runtime.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::{CliError, CliResult};

/// Host platform connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Base URL of the host REST API (e.g. "https://cms.example.com/api")
    pub base_url: String,

    /// Bearer token for host authentication (optional)
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Per-request timeout in seconds (default 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retry attempts for transient host failures (default 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff, in milliseconds (default 250)
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    250
}

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory containing the per-type schema file tree (required)
    pub schema_dir: PathBuf,

    /// Directory containing shared definition documents (required)
    pub definitions_dir: PathBuf,

    /// Host platform settings (optional; local-only commands run without it)
    #[serde(default)]
    pub host: Option<HostConfig>,
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> CliResult<()> {
        if self.schema_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }

        if self.definitions_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("definitions_dir must not be empty"));
        }

        if let Some(host) = &self.host {
            if host.base_url.is_empty() {
                return Err(CliError::config_error("host.base_url must not be empty"));
            }
            if host.timeout_secs == 0 {
                return Err(CliError::config_error("host.timeout_secs must be > 0"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config() {
        let file = write_config(r#"{"schema_dir": "./schemas", "definitions_dir": "./defs"}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("./schemas"));
        assert!(config.host.is_none());
    }

    #[test]
    fn test_host_defaults() {
        let file = write_config(
            r#"{
                "schema_dir": "./schemas",
                "definitions_dir": "./defs",
                "host": {"base_url": "http://localhost:8080"}
            }"#,
        );
        let config = Config::load(file.path()).unwrap();
        let host = config.host.unwrap();
        assert_eq!(host.timeout_secs, 30);
        assert_eq!(host.max_retries, 3);
        assert_eq!(host.backoff_base_ms, 250);
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let file = write_config(
            r#"{
                "schema_dir": "./schemas",
                "definitions_dir": "./defs",
                "host": {"base_url": ""}
            }"#,
        );
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_invalid_json_rejected() {
        let file = write_config("not json");
        assert!(Config::load(file.path()).is_err());
    }
}
