use config::{Config, ConfigError, Environment, File};
use mestermind_forms::{FlowSettings, KeySpace, SubmitPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CliError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MestermindConfig {
    pub api: ApiSection,
    pub flow: FlowSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowSection {
    pub autosave_debounce_ms: u64,
    pub require_sign_in: bool,
    pub sign_in_path: String,
}

impl Default for FlowSection {
    fn default() -> Self {
        let policy = SubmitPolicy::default();
        Self {
            autosave_debounce_ms: mestermind_forms::DEFAULT_AUTOSAVE_DELAY.as_millis() as u64,
            require_sign_in: policy.require_sign_in,
            sign_in_path: policy.sign_in_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSection {
    /// JSON file holding draft pointers and submission flags
    pub path: PathBuf,
    pub namespace: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            namespace: KeySpace::default().namespace().to_string(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mestermind")
        .join("config.toml")
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mestermind")
        .join("session.json")
}

impl MestermindConfig {
    /// Loads `path` (or the default location) layered under `MESTERMIND_*`
    /// environment variables, e.g. `MESTERMIND_API__BASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), CliError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = default_config_path();
                if !path.exists() {
                    if let Err(e) = write_default(&path) {
                        tracing::warn!(path = %path.display(), error = %e, "Could not create default config");
                    }
                }
                path
            }
        };

        let config = Self::from_sources(&config_path)
            .map_err(|e| CliError::Config(format!("{}: {e}", config_path.display())))?;
        tracing::debug!(path = %config_path.display(), "Configuration loaded");
        Ok((config, config_path))
    }

    fn from_sources(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("MESTERMIND")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Command-line flags win over file and environment
    pub fn with_overrides(mut self, api_url: Option<&str>, token: Option<&str>) -> Self {
        if let Some(url) = api_url {
            self.api.base_url = url.to_string();
        }
        if let Some(token) = token {
            self.api.token = Some(token.to_string());
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn flow_settings(&self) -> FlowSettings {
        FlowSettings {
            autosave_delay: Duration::from_millis(self.flow.autosave_debounce_ms),
            keys: KeySpace::new(self.storage.namespace.clone()),
            submit: SubmitPolicy {
                require_sign_in: self.flow.require_sign_in,
                sign_in_path: self.flow.sign_in_path.clone(),
            },
        }
    }

    pub fn to_toml(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to render config: {e}")))
    }
}

pub fn write_default(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, MestermindConfig::default().to_toml()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_sections_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://mestermind.test/api/v1\"\n\n[flow]\nrequire_sign_in = false\n",
        )
        .unwrap();

        let (config, loaded_from) = MestermindConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded_from, path);
        assert_eq!(config.api.base_url, "https://mestermind.test/api/v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(!config.flow.require_sign_in);
        assert_eq!(config.flow.sign_in_path, "/register");
        assert_eq!(config.storage.namespace, "mestermind");
    }

    #[test]
    fn test_flags_override_file() {
        let config = MestermindConfig::default()
            .with_overrides(Some("http://127.0.0.1:9000"), Some("secret"));
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_default_file_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_default(&path).unwrap();

        let (config, _) = MestermindConfig::load(Some(&path)).unwrap();
        assert_eq!(config.api, ApiSection::default());
        assert_eq!(config.flow, FlowSection::default());
    }

    #[test]
    fn test_flow_settings_follow_config() {
        let mut config = MestermindConfig::default();
        config.flow.autosave_debounce_ms = 200;
        config.storage.namespace = "staging".to_string();

        let settings = config.flow_settings();
        assert_eq!(settings.autosave_delay, Duration::from_millis(200));
        assert_eq!(settings.keys.namespace(), "staging");
        assert!(settings.submit.require_sign_in);
    }
}
