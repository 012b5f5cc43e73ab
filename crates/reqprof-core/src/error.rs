use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid timestamp '{value}' in line: {line}")]
    InvalidTimestamp { value: String, line: String },

    #[error("Unknown event code '{code}' in line: {line}")]
    UnknownCode { code: String, line: String },

    #[error("Malformed {code} payload: '{payload}'")]
    MalformedPayload { code: char, payload: String },

    #[error("No tracked request for {process_id}/{request_id}")]
    UnknownRequest {
        process_id: String,
        request_id: String,
    },

    #[error("{spec} is not a valid {mode} sort spec, use one of {}", .valid.join(", "))]
    InvalidSort {
        spec: String,
        mode: &'static str,
        valid: &'static [&'static str],
    },

    #[error("bad date {0}")]
    BadDate(String),

    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No input: give one or more trace log files or --read-stats")]
    MissingInput,

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Unsupported stats file version {0}")]
    UnsupportedSnapshot(u32),

    #[error("Failed to read trace data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to process stats file: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Coarse classification used by the CLI to pick an exit behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A line could not be decoded into an event.
    Decode,
    /// An event referenced a request that is not being tracked.
    Lifecycle,
    /// Bad user input: sort spec, date, missing or unreadable file.
    Configuration,
    /// Anything else.
    Unrecoverable,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTimestamp { .. }
            | Error::UnknownCode { .. }
            | Error::MalformedPayload { .. } => ErrorKind::Decode,
            Error::UnknownRequest { .. } => ErrorKind::Lifecycle,
            Error::InvalidSort { .. }
            | Error::BadDate(_)
            | Error::Open { .. }
            | Error::MissingInput
            | Error::InvalidOption(_)
            | Error::UnsupportedSnapshot(_) => ErrorKind::Configuration,
            Error::Io(_) | Error::Snapshot(_) => ErrorKind::Unrecoverable,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
