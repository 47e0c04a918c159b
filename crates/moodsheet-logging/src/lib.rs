//! Logging configuration and subscriber setup for moodsheet.
//!
//! Library crates only emit `tracing` events. The binary calls [`init`] once,
//! which installs a subscriber writing to a dated log file and, optionally,
//! to stderr.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Events from these target prefixes follow the configured level; everything
/// else (HTTP stack, etc.) is capped at WARN.
const OWN_TARGET: &str = "moodsheet";

/// Log level for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
            LogLevel::Critical => 4,
        }
    }

    /// Check if this threshold lets a message at `level` through
    pub fn should_log(&self, level: LogLevel) -> bool {
        level.rank() >= self.rank()
    }

    /// `tracing` has no level above ERROR, so CRITICAL shares it.
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => anyhow::bail!(
                "unknown log level {other:?} (expected DEBUG, INFO, WARNING, ERROR or CRITICAL)"
            ),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Minimum level to output
    pub level: LogLevel,
    /// Base log path. Only its directory is used; the file name is dated.
    pub path: PathBuf,
    /// Mirror log lines to stderr
    #[serde(default = "default_true")]
    pub console_output: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            path: PathBuf::from("logs/moodsheet.log"),
            console_output: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn log_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// `<dir of config.path>/moodsheet_<YYYY-MM-DD>.log`
pub fn log_file_path(config: &LoggingConfig, date: NaiveDate) -> PathBuf {
    config
        .log_dir()
        .join(format!("moodsheet_{}.log", date.format("%Y-%m-%d")))
}

fn targets(level: LogLevel) -> Targets {
    let own = level.level_filter();
    Targets::new()
        .with_default(own.min(LevelFilter::WARN))
        .with_target(OWN_TARGET, own)
}

/// Install the process-wide subscriber: dated log file plus optional stderr.
///
/// Returns the path of the log file. Fails if the directory or file cannot be
/// created, or if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<PathBuf> {
    let path = log_file_path(config, chrono::Local::now().date_naive());
    let dir = config.log_dir();
    if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir).with_context(|| format!("create log dir {dir:?}"))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {path:?}"))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false);
    let console_layer = config.console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(targets(config.level))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("install log subscriber")?;

    tracing::info!("logging initialised, log file: {}", path.display());
    Ok(path)
}

/// Stderr-only subscriber for failures before the configuration is known.
/// A subscriber that is already installed is left in place.
pub fn init_console(level: LogLevel) {
    let _ = tracing_subscriber::registry()
        .with(targets(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
