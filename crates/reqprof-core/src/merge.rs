//! K-way merge of independently written trace logs.
//!
//! Each input keeps a one-slot lookahead holding its next decoded event. A
//! call to [`StreamMerger::next_event`] fills every empty slot, then hands out
//! the earliest buffered event; the other slots stay filled for the next call,
//! so no input is read further than it needs to be.

use crate::event::{LogEvent, decode_line};
use crate::source::TraceSource;
use crate::Result;
use std::io::BufRead;

/// Per-input state: the reader and the buffered, not yet claimed event.
struct MergeCursor {
    name: String,
    reader: Option<Box<dyn BufRead>>,
    lookahead: Option<LogEvent>,
    line_no: usize,
}

impl MergeCursor {
    fn new(source: TraceSource) -> Self {
        Self {
            name: source.name,
            reader: Some(source.reader),
            lookahead: None,
            line_no: 0,
        }
    }

    /// Return the buffered event, reading ahead if the slot is empty.
    fn peek(&mut self, skipped: &mut usize) -> Result<Option<&LogEvent>> {
        if self.lookahead.is_none() {
            self.lookahead = self.read_next(skipped)?;
        }
        Ok(self.lookahead.as_ref())
    }

    /// Read lines until one decodes. Corrupt lines are counted and dropped.
    fn read_next(&mut self, skipped: &mut usize) -> Result<Option<LogEvent>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                tracing::debug!("{}: end of data after {} lines", self.name, self.line_no);
                // Release the input as soon as it has nothing more to give.
                self.reader = None;
                return Ok(None);
            }
            self.line_no += 1;

            let line = String::from_utf8_lossy(&buf);
            match decode_line(&line) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => {
                    tracing::debug!("{}:{}: unparseable line ignored", self.name, self.line_no);
                }
                Err(e) => {
                    tracing::warn!("{}:{}: skipping corrupt line: {}", self.name, self.line_no, e);
                    *skipped += 1;
                }
            }
        }
    }
}

/// Yields events from all inputs in global timestamp order.
///
/// Equal timestamps are resolved in favor of the input that was listed first.
pub struct StreamMerger {
    cursors: Vec<MergeCursor>,
    skipped: usize,
}

impl StreamMerger {
    pub fn new(sources: Vec<TraceSource>) -> Self {
        Self {
            cursors: sources.into_iter().map(MergeCursor::new).collect(),
            skipped: 0,
        }
    }

    /// Claim the earliest pending event, or `None` once every input is drained.
    pub fn next_event(&mut self) -> Result<Option<LogEvent>> {
        let mut earliest: Option<(usize, f64)> = None;

        for (idx, cursor) in self.cursors.iter_mut().enumerate() {
            if let Some(event) = cursor.peek(&mut self.skipped)?
                && earliest.is_none_or(|(_, t)| event.timestamp < t)
            {
                earliest = Some((idx, event.timestamp));
            }
        }

        Ok(earliest.and_then(|(idx, _)| self.cursors[idx].lookahead.take()))
    }

    /// Number of corrupt lines dropped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for StreamMerger {
    type Item = Result<LogEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventCode;
    use std::io::Cursor;

    fn source(name: &str, body: &str) -> TraceSource {
        TraceSource::from_reader(name, Cursor::new(body.to_string()))
    }

    #[test]
    fn test_merge_interleaved_streams_in_time_order() {
        let a = source("a", "B 1 1 1.0 GET /a\nE 1 1 4.0\nB 1 2 7.0 GET /c\n");
        let b = source("b", "B 2 1 2.0 GET /b\nE 2 1 3.0\nE 1 2 9.0\n");

        let merger = StreamMerger::new(vec![a, b]);
        let times: Vec<f64> = merger.map(|e| e.unwrap().timestamp).collect();

        assert_eq!(times, vec![1.0, 2.0, 3.0, 4.0, 7.0, 9.0]);
    }

    #[test]
    fn test_output_is_non_decreasing_for_uneven_streams() {
        let a = source("a", "B 1 1 5.0 GET /\nE 1 1 5.0\nB 1 2 5.5 GET /\n");
        let b = source("b", "");
        let c = source("c", "B 3 1 0.5 GET /\nB 3 2 5.0 GET /\nE 3 2 6.0\nE 3 1 8.0\n");

        let merger = StreamMerger::new(vec![a, b, c]);
        let times: Vec<f64> = merger.map(|e| e.unwrap().timestamp).collect();

        assert_eq!(times.len(), 7);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_ties_go_to_first_listed_stream() {
        let a = source("a", "B 1 1 5.0 GET /first\n");
        let b = source("b", "B 2 1 5.0 GET /second\n");

        let mut merger = StreamMerger::new(vec![a, b]);
        let first = merger.next_event().unwrap().unwrap();
        let second = merger.next_event().unwrap().unwrap();

        assert_eq!(first.process_id, "1");
        assert_eq!(second.process_id, "2");
    }

    #[test]
    fn test_corrupt_lines_are_skipped_without_stopping_the_merge() {
        let a = source("a", "B 1 1 bogus GET /x\nQ 1 1 2.0\nE 1 1 3.0\n");
        let b = source("b", "garbage\nB 2 1 1.0 GET /y\n");

        let mut merger = StreamMerger::new(vec![a, b]);
        let events: Vec<LogEvent> = merger.by_ref().map(|e| e.unwrap()).collect();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].code, EventCode::Begin);
        assert_eq!(events[1].code, EventCode::End);
        assert_eq!(merger.skipped(), 2);
    }

    #[test]
    fn test_exhausted_merger_keeps_returning_none() {
        let mut merger = StreamMerger::new(vec![source("a", "E 1 1 1.0\n")]);
        assert!(merger.next_event().unwrap().is_some());
        assert!(merger.next_event().unwrap().is_none());
        assert!(merger.next_event().unwrap().is_none());
    }
}
