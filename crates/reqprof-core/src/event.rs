//! Decoding of single trace-log lines.
//!
//! A line looks like `CODE PID REQID TIMESTAMP [PAYLOAD]`. The first four
//! fields are whitespace-delimited; whatever follows is the payload, kept
//! verbatim (it may itself contain spaces, e.g. `GET /index.html`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle code carried by a trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCode {
    /// `B`: request began; payload is `METHOD URL`.
    Begin,
    /// `I`: request input received; payload optionally holds the input size.
    Input,
    /// `A`: application output started; payload is `HTTPCODE OSIZE`.
    Output,
    /// `E`: request ended.
    End,
    /// `U`: process started or restarted; payload is free text.
    Startup,
}

impl EventCode {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'B' => Some(EventCode::Begin),
            'I' => Some(EventCode::Input),
            'A' => Some(EventCode::Output),
            'E' => Some(EventCode::End),
            'U' => Some(EventCode::Startup),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            EventCode::Begin => 'B',
            EventCode::Input => 'I',
            EventCode::Output => 'A',
            EventCode::End => 'E',
            EventCode::Startup => 'U',
        }
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One decoded trace-log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub code: EventCode,
    pub process_id: String,
    pub request_id: String,
    /// Seconds since the epoch.
    pub timestamp: f64,
    pub payload: String,
}

/// Decode one raw line.
///
/// Returns `Ok(None)` when the line does not have at least four fields; such
/// lines are noise and callers drop them. A non-numeric timestamp or an
/// unrecognized code is an error, since it means the stream is corrupt.
pub fn decode_line(line: &str) -> Result<Option<LogEvent>> {
    let Some(([code, pid, rid, time], payload)) = split_fields(line) else {
        return Ok(None);
    };

    let timestamp = match time.parse::<f64>() {
        Ok(t) if t.is_finite() => t,
        _ => {
            return Err(Error::InvalidTimestamp {
                value: time.to_string(),
                line: line.trim().to_string(),
            });
        }
    };

    let mut chars = code.chars();
    let code = match (chars.next().and_then(EventCode::from_char), chars.next()) {
        (Some(code), None) => code,
        _ => {
            return Err(Error::UnknownCode {
                code: code.to_string(),
                line: line.trim().to_string(),
            });
        }
    };

    Ok(Some(LogEvent {
        code,
        process_id: pid.to_string(),
        request_id: rid.to_string(),
        timestamp,
        payload: payload.to_string(),
    }))
}

/// Split off the four leading fields, leaving the remainder as the payload.
fn split_fields(line: &str) -> Option<([&str; 4], &str)> {
    let mut rest = line.trim();
    let mut fields = [""; 4];
    for slot in fields.iter_mut() {
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        *slot = &rest[..end];
        rest = rest[end..].trim_start();
    }
    Some((fields, rest))
}
