use crate::event::{EventCode, LogEvent};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How far a request got. Ordered by progress, with process-startup markers
/// sorting ahead of everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Startup,
    Begin,
    Input,
    Output,
    End,
}

impl Stage {
    pub fn as_char(&self) -> char {
        match self {
            Stage::Startup => 'U',
            Stage::Begin => 'B',
            Stage::Input => 'I',
            Stage::Output => 'A',
            Stage::End => 'E',
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// A request reconstructed from B/I/A/E events.
    Http,
    /// A process (re)start marker from a `U` event. Only `url` and `start`
    /// are meaningful; it never changes after creation.
    Startup,
}

/// A request reconstructed from its lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub kind: RequestKind,
    /// Request URL, or the startup description for startup markers.
    pub url: String,
    pub method: Option<String>,
    pub start: f64,
    pub t_recv_input: Option<f64>,
    /// Request body size from the first token of the `I` payload, 0 when
    /// absent or not numeric. Older profilers always left this at 0; reqprof
    /// fills it so the `isize` sort has something to order by.
    pub input_size: u64,
    pub t_recv_output: Option<f64>,
    pub output_size: Option<String>,
    pub http_code: Option<String>,
    pub t_end: Option<f64>,
    /// `t_end - start`; present only once the `E` event was seen.
    pub elapsed: Option<f64>,
    /// How many requests began while this one was in flight.
    pub active: u32,
}

impl Request {
    /// Create a request from its `B` event.
    pub fn begin(event: &LogEvent) -> Result<Self> {
        let (method, url) = parse_begin(&event.payload)?;
        Ok(Self {
            kind: RequestKind::Http,
            url,
            method: Some(method),
            start: event.timestamp,
            t_recv_input: None,
            input_size: 0,
            t_recv_output: None,
            output_size: None,
            http_code: None,
            t_end: None,
            elapsed: None,
            active: 0,
        })
    }

    /// Create a process startup marker.
    pub fn startup(description: impl Into<String>, at: f64) -> Self {
        Self {
            kind: RequestKind::Startup,
            url: description.into(),
            method: None,
            start: at,
            t_recv_input: None,
            input_size: 0,
            t_recv_output: None,
            output_size: None,
            http_code: None,
            t_end: None,
            elapsed: None,
            active: 0,
        }
    }

    /// Fold one lifecycle event into this request.
    ///
    /// A repeated `B` re-applies the begin fields to the same record.
    pub fn apply(&mut self, event: &LogEvent) -> Result<()> {
        let t = event.timestamp;
        match event.code {
            EventCode::Begin => {
                let (method, url) = parse_begin(&event.payload)?;
                self.start = t;
                self.method = Some(method);
                self.url = url;
            }
            EventCode::Input => {
                self.t_recv_input = Some(t);
                if let Some(size) = event
                    .payload
                    .split_whitespace()
                    .next()
                    .and_then(|s| s.parse().ok())
                {
                    self.input_size = size;
                }
            }
            EventCode::Output => {
                let mut fields = event.payload.split_whitespace();
                let (Some(code), Some(size), None) = (fields.next(), fields.next(), fields.next())
                else {
                    return Err(malformed(event));
                };
                if self.t_recv_input.is_none() {
                    self.t_recv_input = Some(t);
                }
                self.t_recv_output = Some(t);
                self.http_code = Some(code.to_string());
                self.output_size = Some(size.to_string());
            }
            EventCode::End => {
                self.t_end = Some(t);
                self.elapsed = Some(t - self.start);
            }
            EventCode::Startup => return Err(malformed(event)),
        }
        Ok(())
    }

    pub fn is_startup(&self) -> bool {
        self.kind == RequestKind::Startup
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Last stage reached, derived from which timestamps are set.
    pub fn stage(&self) -> Stage {
        if self.is_startup() {
            Stage::Startup
        } else if self.t_end.is_some() {
            Stage::End
        } else if self.t_recv_output.is_some() {
            Stage::Output
        } else if self.t_recv_input.is_some() {
            Stage::Input
        } else {
            Stage::Begin
        }
    }

    /// Seconds spent waiting for input.
    pub fn win(&self) -> Option<f64> {
        self.t_recv_input.map(|t| t - self.start)
    }

    /// Seconds the application took to start output.
    pub fn wout(&self) -> Option<f64> {
        Some(self.t_recv_output? - self.t_recv_input?)
    }

    /// Seconds spent sending output.
    pub fn wend(&self) -> Option<f64> {
        Some(self.t_end? - self.t_recv_output?)
    }

    /// Time from begin to the last observed stage.
    pub fn total(&self) -> f64 {
        match self.stage() {
            Stage::Startup | Stage::Begin => 0.0,
            Stage::Input => self.win().unwrap_or(0.0),
            Stage::Output => self.t_recv_output.map_or(0.0, |t| t - self.start),
            Stage::End => self.elapsed.unwrap_or(0.0),
        }
    }
}

fn parse_begin(payload: &str) -> Result<(String, String)> {
    let mut fields = payload.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(method), Some(url), None) => Ok((method.to_string(), url.to_string())),
        _ => Err(Error::MalformedPayload {
            code: 'B',
            payload: payload.to_string(),
        }),
    }
}

fn malformed(event: &LogEvent) -> Error {
    Error::MalformedPayload {
        code: event.code.as_char(),
        payload: event.payload.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(code: EventCode, t: f64, payload: &str) -> LogEvent {
        LogEvent {
            code,
            process_id: "p1".to_string(),
            request_id: "r1".to_string(),
            timestamp: t,
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_begin_output_end() {
        let mut req = Request::begin(&event(EventCode::Begin, 0.0, "GET /x")).unwrap();
        req.apply(&event(EventCode::Output, 1.0, "200 100")).unwrap();
        req.apply(&event(EventCode::End, 2.0, "")).unwrap();

        assert_eq!(req.url, "/x");
        assert_eq!(req.method.as_deref(), Some("GET"));
        assert_eq!(req.start, 0.0);
        assert_eq!(req.t_recv_input, Some(1.0));
        assert_eq!(req.t_recv_output, Some(1.0));
        assert_eq!(req.http_code.as_deref(), Some("200"));
        assert_eq!(req.output_size.as_deref(), Some("100"));
        assert_eq!(req.t_end, Some(2.0));
        assert_eq!(req.elapsed, Some(2.0));
        assert_eq!(req.stage(), Stage::End);
    }

    #[test]
    fn test_input_event_keeps_its_own_time() {
        let mut req = Request::begin(&event(EventCode::Begin, 10.0, "POST /form")).unwrap();
        req.apply(&event(EventCode::Input, 10.5, "2048")).unwrap();
        assert_eq!(req.stage(), Stage::Input);
        assert_eq!(req.input_size, 2048);

        req.apply(&event(EventCode::Output, 12.0, "302 0")).unwrap();
        assert_eq!(req.t_recv_input, Some(10.5));
        assert_eq!(req.win(), Some(0.5));
        assert_eq!(req.wout(), Some(1.5));
        assert_eq!(req.wend(), None);
        assert_eq!(req.total(), 2.0);
        assert!(!req.is_finished());
    }

    #[test]
    fn test_non_numeric_input_size_keeps_zero() {
        let mut req = Request::begin(&event(EventCode::Begin, 10.0, "POST /form")).unwrap();
        req.apply(&event(EventCode::Input, 10.5, "chunked")).unwrap();
        assert_eq!(req.t_recv_input, Some(10.5));
        assert_eq!(req.input_size, 0);
    }

    #[test]
    fn test_stage_dependent_total() {
        let req = Request::begin(&event(EventCode::Begin, 3.0, "GET /")).unwrap();
        assert_eq!(req.stage(), Stage::Begin);
        assert_eq!(req.total(), 0.0);
        assert_eq!(req.win(), None);
    }

    #[test]
    fn test_repeated_begin_overwrites_in_place() {
        let mut req = Request::begin(&event(EventCode::Begin, 1.0, "GET /old")).unwrap();
        req.active = 3;
        req.apply(&event(EventCode::Begin, 2.0, "POST /new")).unwrap();

        assert_eq!(req.url, "/new");
        assert_eq!(req.method.as_deref(), Some("POST"));
        assert_eq!(req.start, 2.0);
        assert_eq!(req.active, 3);
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(Request::begin(&event(EventCode::Begin, 1.0, "GET")).is_err());

        let mut req = Request::begin(&event(EventCode::Begin, 1.0, "GET /")).unwrap();
        let err = req.apply(&event(EventCode::Output, 2.0, "200")).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { code: 'A', .. }));
        assert_eq!(req.stage(), Stage::Begin);
    }

    #[test]
    fn test_startup_marker() {
        let marker = Request::startup("Zope restarted", 50.0);
        assert_eq!(marker.stage(), Stage::Startup);
        assert_eq!(marker.total(), 0.0);
        assert!(!marker.is_finished());
    }

    #[test]
    fn test_stage_ordering() {
        assert!(Stage::Begin < Stage::Input);
        assert!(Stage::Input < Stage::Output);
        assert!(Stage::Output < Stage::End);
    }
}
