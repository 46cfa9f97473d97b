//! Runtime configuration loading from environment variables.
//!
//! All configuration values are loaded from `MAILSIFT_*` environment variables
//! with sensible defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `MAILSIFT_DEVICE` | auto | `auto` probes for an accelerator, `cpu` never uses one |
//! | `MAILSIFT_LABELS_PATH` | label_classes.json | JSON array of category names |
//! | `MAILSIFT_CLASSIFIER_MODEL` | ro08hi11t23/email-classifier-bert | Classifier model id |
//! | `MAILSIFT_SUMMARIZER_MODEL` | facebook/bart-large-cnn | Summarizer model id |
//! | `MAILSIFT_LOG_LEVEL` | info | Tracing filter directive |
//! | `MAILSIFT_LOG_FORMAT` | json | `json` or `pretty` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::engine::DeviceState;
use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_LABELS_PATH: &str = "label_classes.json";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "ro08hi11t23/email-classifier-bert";
pub const DEFAULT_SUMMARIZER_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Which devices the process may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Use an accelerator when one is detected.
    #[default]
    Auto,
    Cpu,
}

impl DevicePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
        }
    }
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            other => Err(format!("unknown device preference: {other}")),
        }
    }
}

/// Effective runtime configuration summary (serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub device: DevicePreference,
    pub labels_path: String,
    pub classifier_model: String,
    pub summarizer_model: String,
    pub log_level: String,
    pub log_format: String,
}

/// All runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub device: DevicePreference,
    pub labels_path: PathBuf,
    pub classifier_model: String,
    pub summarizer_model: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Read a non-blank string env var, returning `default` when missing or blank.
fn parse_string(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Parse an env var with `FromStr`, returning `default` on missing or invalid.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    EnvConfig {
        device: parse_or("MAILSIFT_DEVICE", DevicePreference::Auto),
        labels_path: PathBuf::from(parse_string("MAILSIFT_LABELS_PATH", DEFAULT_LABELS_PATH)),
        classifier_model: parse_string("MAILSIFT_CLASSIFIER_MODEL", DEFAULT_CLASSIFIER_MODEL),
        summarizer_model: parse_string("MAILSIFT_SUMMARIZER_MODEL", DEFAULT_SUMMARIZER_MODEL),
        log_level: parse_string("MAILSIFT_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        log_format: parse_or("MAILSIFT_LOG_FORMAT", LogFormat::Json),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            device: self.device,
            labels_path: self.labels_path.display().to_string(),
            classifier_model: self.classifier_model.clone(),
            summarizer_model: self.summarizer_model.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.as_str().to_string(),
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            level: self.log_level.clone(),
        }
    }

    /// Shared device state for the classifier and summarizer.
    pub fn device_state(&self) -> DeviceState {
        match self.device {
            DevicePreference::Auto => DeviceState::detect(),
            DevicePreference::Cpu => DeviceState::cpu_only(),
        }
    }
}

// Serialize env-mutating tests across modules to avoid cross-test pollution.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
