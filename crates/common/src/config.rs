//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PathreplayError, PathreplayResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default recording settings.
    pub recording: RecordingDefaults,

    /// Vision estimator settings.
    pub estimator: EstimatorConfig,

    /// Platform collaborator settings.
    pub platform: PlatformConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default recording parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingDefaults {
    /// Total capture window in milliseconds.
    pub duration_ms: u64,

    /// Sampling period in milliseconds.
    pub period_ms: u64,

    /// Coordinate space positions are persisted in: `unit`, `logical` or `physical`.
    pub coordinate_space: String,

    /// Default log path.
    pub output: PathBuf,
}

/// Vision estimator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Whether each tick also asks the vision model where the cursor is.
    pub enabled: bool,

    /// Model identifier.
    pub model: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// API base URL.
    pub endpoint: String,

    /// Upper bound on a single estimate call.
    pub timeout_ms: u64,

    /// Where annotated frames are dumped for inspection, if anywhere.
    pub debug_frames_dir: Option<PathBuf>,
}

/// Platform collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Shell command that writes a PNG screenshot of the whole display to stdout.
    pub screenshot_command: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "pathreplay=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for RecordingDefaults {
    fn default() -> Self {
        Self {
            duration_ms: 30_000,
            period_ms: 1_000,
            coordinate_space: "unit".to_string(),
            output: PathBuf::from("mouse_movements.trace"),
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_ms: 5_000,
            debug_frames_dir: None,
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            screenshot_command: "import -window root png:-".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl RecordingDefaults {
    /// Reject periods or windows that would make the run meaningless.
    pub fn validate(&self) -> PathreplayResult<()> {
        if self.period_ms == 0 {
            return Err(PathreplayError::config("sampling period must be positive"));
        }
        if self.duration_ms == 0 {
            return Err(PathreplayError::config("capture duration must be positive"));
        }
        Ok(())
    }
}

impl EstimatorConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// Absent or empty is a startup error.
    pub fn api_key(&self) -> PathreplayResult<String> {
        Self::api_key_from(&self.api_key_env, std::env::var(&self.api_key_env).ok())
    }

    fn api_key_from(var: &str, value: Option<String>) -> PathreplayResult<String> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(PathreplayError::config(format!(
                "{var} environment variable not set"
            ))),
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("pathreplay").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let raw = r#"{ "recording": { "period_ms": 250 } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.recording.period_ms, 250);
        assert_eq!(config.recording.duration_ms, 30_000);
        assert_eq!(config.recording.coordinate_space, "unit");
        assert!(!config.estimator.enabled);
        assert_eq!(config.estimator.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn zero_period_is_rejected() {
        let defaults = RecordingDefaults {
            period_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            defaults.validate(),
            Err(PathreplayError::Config { .. })
        ));
    }

    #[test]
    fn missing_or_blank_api_key_is_config_error() {
        assert!(EstimatorConfig::api_key_from("GEMINI_API_KEY", None).is_err());
        assert!(EstimatorConfig::api_key_from("GEMINI_API_KEY", Some("  ".into())).is_err());
        assert_eq!(
            EstimatorConfig::api_key_from("GEMINI_API_KEY", Some(" abc ".into())).unwrap(),
            "abc"
        );
    }
}
