use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

const TOKEN_ENV: &str = "TASKDECK_TOKEN";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
const MIN_REQUEST_TIMEOUT_MS: u64 = 500;
const MAX_REQUEST_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const MIN_ROW_HEIGHT: usize = 1;
const MAX_ROW_HEIGHT: usize = 10;
const DEFAULT_ROW_HEIGHT: usize = 3;
const MAX_OVERSCAN: usize = 50;
const DEFAULT_OVERSCAN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    /// Bearer token for the remote service. The `TASKDECK_TOKEN`
    /// environment variable takes precedence over this field.
    pub token: Option<String>,
    pub request_timeout_ms: u64,
    /// Estimated task row height in terminal lines.
    pub row_height: usize,
    /// Extra rows rendered above and below the visible range.
    pub overscan: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("taskdeck");
        path.push("settings.toml");
        Some(path)
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from_path(&path)
    }

    fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    settings.validate();
                    settings
                }
                Err(error) => {
                    warn!(
                        "failed to parse settings config '{}': {}",
                        path.display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(error) => {
                warn!(
                    "failed to read settings config '{}': {}",
                    path.display(),
                    error
                );
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().ok_or_else(|| anyhow!("unable to determine config path"))?;
        self.save_to_path(&path)
    }

    fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("invalid settings config path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;

        let mut validated = self.clone();
        validated.validate();
        let contents =
            toml::to_string_pretty(&validated).context("failed to serialize settings to TOML")?;

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("invalid settings config file name"))?
            .to_string_lossy()
            .to_string();
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents).with_context(|| {
            format!(
                "failed to write temporary settings file '{}'",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to atomically rename settings file '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Effective token: environment override first, then the config file.
    pub fn bearer_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| self.token.clone())
            .filter(|token| !token.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&mut self) {
        self.request_timeout_ms = self
            .request_timeout_ms
            .clamp(MIN_REQUEST_TIMEOUT_MS, MAX_REQUEST_TIMEOUT_MS);
        self.row_height = self.row_height.clamp(MIN_ROW_HEIGHT, MAX_ROW_HEIGHT);
        self.overscan = self.overscan.min(MAX_OVERSCAN);

        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            warn!("empty api_base_url in settings config; falling back to default");
            self.api_base_url = DEFAULT_API_BASE_URL.to_string();
        } else {
            self.api_base_url = trimmed.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_file_path(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("taskdeck").join("settings.toml")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert!(settings.token.is_none());
        assert_eq!(settings.request_timeout_ms, 10_000);
        assert_eq!(settings.row_height, 3);
        assert_eq!(settings.overscan, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("temp dir should create");
        let path = settings_file_path(&temp_dir);
        let settings = Settings::load_from_path(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_malformed_toml() {
        let temp_dir = TempDir::new().expect("temp dir should create");
        let path = settings_file_path(&temp_dir);
        fs::create_dir_all(path.parent().expect("settings path should have parent"))
            .expect("failed to create config dir");
        fs::write(&path, "api_base_url = \"http://x\"\nrow_height = [invalid")
            .expect("failed to write malformed settings");

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_partial_toml() {
        let temp_dir = TempDir::new().expect("temp dir should create");
        let path = settings_file_path(&temp_dir);
        fs::create_dir_all(path.parent().expect("settings path should have parent"))
            .expect("failed to create config dir");
        fs::write(&path, "api_base_url = \"https://todo.example.com/api/v1\"")
            .expect("failed to write partial settings");

        let settings = Settings::load_from_path(&path);
        assert_eq!(settings.api_base_url, "https://todo.example.com/api/v1");
        assert_eq!(settings.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(settings.row_height, DEFAULT_ROW_HEIGHT);
        assert_eq!(settings.overscan, DEFAULT_OVERSCAN);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().expect("temp dir should create");
        let path = settings_file_path(&temp_dir);
        let mut expected = Settings {
            api_base_url: "https://todo.example.com/api/v1".to_string(),
            token: Some("secret".to_string()),
            request_timeout_ms: 2_500,
            row_height: 4,
            overscan: 8,
        };
        expected.validate();

        expected
            .save_to_path(&path)
            .expect("failed to save settings for roundtrip test");
        let loaded = Settings::load_from_path(&path);

        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut settings = Settings {
            request_timeout_ms: 1,
            row_height: 99,
            overscan: 1_000,
            ..Settings::default()
        };

        settings.validate();

        assert_eq!(settings.request_timeout_ms, MIN_REQUEST_TIMEOUT_MS);
        assert_eq!(settings.row_height, MAX_ROW_HEIGHT);
        assert_eq!(settings.overscan, MAX_OVERSCAN);

        settings.request_timeout_ms = u64::MAX;
        settings.row_height = 0;
        settings.validate();

        assert_eq!(settings.request_timeout_ms, MAX_REQUEST_TIMEOUT_MS);
        assert_eq!(settings.row_height, MIN_ROW_HEIGHT);
    }

    #[test]
    fn test_validate_normalizes_base_url() {
        let mut settings = Settings {
            api_base_url: "  https://todo.example.com/api/v1/  ".to_string(),
            ..Settings::default()
        };
        settings.validate();
        assert_eq!(settings.api_base_url, "https://todo.example.com/api/v1");

        settings.api_base_url = "   ".to_string();
        settings.validate();
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    }
}
