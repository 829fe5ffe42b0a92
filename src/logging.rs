//! Logging setup built on `tracing` / `tracing-subscriber`.
//!
//! Applications embedding the client can install their own subscriber; these
//! helpers exist for binaries and tests that want a reasonable default.
//! `RUST_LOG` overrides the configured level when set.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// General operational messages.
    #[default]
    Info,
    /// Per-request detail.
    Debug,
    /// Everything, including wire-level detail.
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// Multi-line output with full span context.
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level to emit.
    #[serde(default)]
    pub level: LogLevel,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Installs a global subscriber, returning an error if one is already set.
pub fn try_init_logging(
    config: &LogConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.format {
        LogFormat::Compact => builder.compact().try_init()?,
        LogFormat::Pretty => builder.pretty().try_init()?,
        LogFormat::Json => builder.json().try_init()?,
    }
    Ok(())
}

/// Installs a global subscriber, ignoring the error if one is already set.
pub fn init_logging(config: &LogConfig) {
    let _ = try_init_logging(config);
}
