//! Error types for the madriguera library.

use std::path::PathBuf;

/// Errors raised around the evaluator: storage, configuration and user input.
///
/// The evaluator itself never fails. Invalid schedules are simply never due.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error while reading or writing the data directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A data file exists but does not hold valid JSON.
    #[error("corrupt data file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the in-memory collections failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The configuration file could not be parsed.
    #[error("config error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid date '{0}', use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown recurrence '{0}', supported: once, daily, weekly, monthly")]
    InvalidRecurrence(String),

    #[error("unknown weekday '{0}'")]
    InvalidWeekday(String),

    #[error("day of month must be between 1 and 31, got {0}")]
    InvalidDayOfMonth(u32),

    #[error("unknown locale '{0}', supported: es-AR, en")]
    InvalidLocale(String),

    #[error("unknown color '{0}', supported: blue, green, amber, gray, red")]
    InvalidColor(String),

    #[error("unknown place '{0}'")]
    UnknownPlace(String),

    #[error("an item needs at least one place")]
    NoPlace,
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;
