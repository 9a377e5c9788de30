//! Tracing/logging initialization.
//!
//! Logs go to stderr so that command output on stdout stays machine-readable.

use core::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log layout (`text` or `json`).
pub const LOG_FORMAT_ENV: &str = "SUPPLIES_LOG_FORMAT";

/// Log line layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Read the layout from [`LOG_FORMAT_ENV`], falling back to text.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Subscriber settings. `RUST_LOG` always wins over `default_filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub default_filter: String,
}

impl LogConfig {
    /// Quiet by default (`error`), `debug` when verbose.
    pub fn new(format: LogFormat, verbose: bool) -> Self {
        let default_filter = if verbose { "debug" } else { "error" };
        Self {
            format,
            default_filter: default_filter.to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(LogFormat::default(), false)
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
    };
}
