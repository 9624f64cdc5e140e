//! Structured logging via `tracing`.
//!
//! The library only emits events; the binary installs a `fmt` subscriber
//! once at startup with [`init_logging`].

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Include the module path of each event.
    pub include_target: bool,
    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            include_target: false,
            ansi_colors: true,
        }
    }
}

impl LogConfig {
    /// Per-epoch and per-session events included.
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            include_target: true,
            ..Self::default()
        }
    }

    /// Errors only.
    pub fn quiet() -> Self {
        Self {
            level: LogLevel::Error,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level.to_tracing_level())
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(LogConfig::default().level, LogLevel::Info);
        assert_eq!(LogConfig::verbose().level.to_tracing_level(), Level::DEBUG);
        assert_eq!(LogConfig::quiet().level, LogLevel::Error);
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_logging(&LogConfig::quiet());
        assert!(init_logging(&LogConfig::quiet()).is_err());
    }
}
