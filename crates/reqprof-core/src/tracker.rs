//! Reconstruction of requests from the merged event sequence.

use crate::error::ErrorKind;
use crate::event::{EventCode, LogEvent};
use crate::request::Request;
use crate::window::TimeWindow;
use crate::{Error, Result};
use std::collections::HashMap;

/// `(process id, request id)` of a request in flight.
type RequestKey = (String, String);

struct InFlight {
    /// Arrival order, so flushes keep the order requests began in.
    seq: u64,
    request: Request,
}

/// Folds lifecycle events into [`Request`]s.
///
/// Requests live in the in-flight map from their `B` event until their `E`
/// event, a `U` event for their process, or the end of input.
#[derive(Default)]
pub struct LifecycleTracker {
    in_flight: HashMap<RequestKey, InFlight>,
    finished: Vec<Request>,
    next_seq: u64,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    ///
    /// `Error::UnknownRequest` means an `I`/`A`/`E` arrived for a key that was
    /// never begun, which is normal at the head of a truncated log.
    pub fn observe(&mut self, event: &LogEvent) -> Result<()> {
        if event.code == EventCode::Startup {
            self.restart(event);
            return Ok(());
        }

        let key = (event.process_id.clone(), event.request_id.clone());

        if let Some(slot) = self.in_flight.get_mut(&key) {
            slot.request.apply(event)?;
            if slot.request.is_finished()
                && let Some(done) = self.in_flight.remove(&key)
            {
                self.finished.push(done.request);
            }
            return Ok(());
        }

        if event.code != EventCode::Begin {
            return Err(Error::UnknownRequest {
                process_id: event.process_id.clone(),
                request_id: event.request_id.clone(),
            });
        }

        let request = Request::begin(event)?;
        for pending in self.in_flight.values_mut() {
            pending.request.active += 1;
        }
        self.in_flight.insert(
            key,
            InFlight {
                seq: self.next_seq,
                request,
            },
        );
        self.next_seq += 1;
        Ok(())
    }

    /// Force-finish everything in flight for the restarted process, then
    /// record the startup marker.
    fn restart(&mut self, event: &LogEvent) {
        let keys: Vec<RequestKey> = self
            .in_flight
            .keys()
            .filter(|(pid, _)| *pid == event.process_id)
            .cloned()
            .collect();

        let mut abandoned: Vec<InFlight> = keys
            .iter()
            .filter_map(|key| self.in_flight.remove(key))
            .collect();
        abandoned.sort_by_key(|slot| slot.seq);

        tracing::debug!(
            "Process {} restarted, abandoning {} in-flight requests",
            event.process_id,
            abandoned.len()
        );

        self.finished
            .extend(abandoned.into_iter().map(|slot| slot.request));
        self.finished
            .push(Request::startup(event.payload.clone(), event.timestamp));
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Close out the run: anything still in flight is appended unfinished.
    pub fn finish(self) -> Vec<Request> {
        let mut leftovers: Vec<InFlight> = self.in_flight.into_values().collect();
        leftovers.sort_by_key(|slot| slot.seq);

        let mut requests = self.finished;
        requests.extend(leftovers.into_iter().map(|slot| slot.request));
        requests
    }
}

/// Run events through a tracker, honoring the time window.
///
/// Events before `window.start` are skipped; the first event after
/// `window.end` stops reading altogether. Lifecycle and payload problems are
/// logged and the event dropped; I/O errors abort.
pub fn reconstruct<I>(events: I, window: &TimeWindow) -> Result<Vec<Request>>
where
    I: IntoIterator<Item = Result<LogEvent>>,
{
    let mut tracker = LifecycleTracker::new();
    let mut orphans = 0usize;

    for event in events {
        let event = event?;
        if window.start.is_some_and(|start| event.timestamp < start) {
            continue;
        }
        if window.end.is_some_and(|end| event.timestamp > end) {
            tracing::debug!("Reached end of time window at {}", event.timestamp);
            break;
        }

        if let Err(e) = tracker.observe(&event) {
            match e.kind() {
                ErrorKind::Lifecycle => {
                    tracing::debug!("Discarding {} event: {}", event.code, e);
                    orphans += 1;
                }
                ErrorKind::Decode => {
                    tracing::warn!(
                        "Unable to handle entry: {} {} {}",
                        event.code,
                        event.timestamp,
                        event.payload
                    );
                }
                _ => return Err(e),
            }
        }
    }

    if orphans > 0 {
        tracing::info!("Discarded {} events with no matching begin", orphans);
    }

    let in_flight = tracker.in_flight();
    let requests = tracker.finish();
    tracing::info!(
        "Reconstructed {} requests ({} still in flight at end of input)",
        requests.len(),
        in_flight
    );
    Ok(requests)
}
