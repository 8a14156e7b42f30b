//! Subscriber setup for binaries and tests.
//!
//! The library only emits `tracing` events; diagnostics go out at
//! info/warn/error and pass progress at debug. Embedders that install their
//! own subscriber never need this module.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::DocsError;

static INIT: Once = Once::new();

/// How much of the run to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    /// Fatal diagnostics only.
    Error,
    /// Warnings, the default for documentation runs.
    #[default]
    Warn,
    Info,
    /// Pass-by-pass progress.
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// Level for a `-q`/`-v` style count: each verbose step goes one level
    /// up from `Warn`, quiet wins.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return LogLevel::Silent;
        }
        match verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(DocsError::Other {
                message: format!("invalid log level: {other}"),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Installs a global subscriber at `level`. `RUST_LOG` directives still
/// apply on top. Only the first call in a process has any effect.
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(level.as_filter().into())
            .from_env_lossy();
        install(filter);
    });
}

/// Like [`init_logging`] but driven by `RUST_LOG` alone, falling back to
/// warnings.
pub fn init_logging_from_env() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LogLevel::default().to_string()));
        install(filter);
    });
}

fn install(filter: EnvFilter) {
    // another subscriber may already be installed by the embedding program
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer::layer().compact().with_target(false).without_time())
        .try_init();
}
