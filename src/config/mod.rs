//! Runtime configuration
//!
//! Configuration is environment-driven. `.env` files are honored when
//! present (loaded by the binary entry point before this module reads
//! anything), and every setting has a sensible default so the engine runs
//! with no configuration at all. The synthesis section is optional: it
//! only exists when a credential is present in the environment.

use crate::anonymizer::synthesis::SynthesisConfig;
use crate::domain::{MosaicError, Result};
use serde::{Deserialize, Serialize};

fn default_score_threshold() -> f32 {
    0.3
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional JSON log file path; console-only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(MosaicError::Configuration(format!(
                "invalid log level '{other}' (expected trace, debug, info, warn or error)"
            ))),
        }
    }
}

/// Root configuration for the engine and binary
#[derive(Debug, Clone)]
pub struct MosaicConfig {
    /// Results below this score are dropped when the caller passes no
    /// explicit threshold
    pub default_score_threshold: f32,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Synthesis backend, present only when a credential is configured
    pub synthesis: Option<SynthesisConfig>,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            default_score_threshold: default_score_threshold(),
            logging: LoggingConfig::default(),
            synthesis: None,
        }
    }
}

impl MosaicConfig {
    /// Build configuration from the environment
    pub fn from_env() -> Result<Self> {
        let default_score_threshold = match std::env::var("MOSAIC_SCORE_THRESHOLD") {
            Ok(raw) => raw.parse::<f32>().map_err(|_| {
                MosaicError::Configuration(format!(
                    "MOSAIC_SCORE_THRESHOLD must be a number, got '{raw}'"
                ))
            })?,
            Err(_) => default_score_threshold(),
        };

        let logging = LoggingConfig {
            level: std::env::var("MOSAIC_LOG_LEVEL").unwrap_or_else(|_| default_log_level()),
            file: std::env::var("MOSAIC_LOG_FILE").ok().filter(|f| !f.is_empty()),
        };

        let config = Self {
            default_score_threshold,
            logging,
            synthesis: SynthesisConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the assembled configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_score_threshold) {
            return Err(MosaicError::Configuration(format!(
                "default score threshold {} is outside [0.0, 1.0]",
                self.default_score_threshold
            )));
        }
        self.logging.validate()
    }
}
