use super::Analyzer;
use crate::request::Request;
use crate::window::TimeWindow;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Request counts in fixed-width time slices.
pub struct TimedAnalyzer {
    /// Slice width in seconds.
    pub resolution: u32,
    /// Range to report; open ends default to the data's own extent.
    pub window: TimeWindow,
}

impl TimedAnalyzer {
    pub fn new(resolution: u32, window: TimeWindow) -> Self {
        Self { resolution, window }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    /// Slice start, epoch seconds, aligned to the resolution.
    pub start: i64,
    pub count: usize,
}

impl TimeBucket {
    pub fn rate(&self, resolution: u32) -> f64 {
        self.count as f64 / f64::from(resolution)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedReport {
    pub start: f64,
    pub end: f64,
    pub resolution: u32,
    /// One entry per slice across the range, including empty slices.
    pub buckets: Vec<TimeBucket>,
    pub peak: usize,
    /// Running average folded as `avg = (avg + count) / 2` per slice. This
    /// weights recent slices heavily and is not the arithmetic mean; it is
    /// kept as-is so reports stay comparable with older output.
    pub average: f64,
    pub total: usize,
}

impl TimedReport {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn empty(resolution: u32, window: &TimeWindow) -> Self {
        Self {
            start: window.start.unwrap_or(0.0),
            end: window.end.unwrap_or(0.0),
            resolution,
            buckets: Vec::new(),
            peak: 0,
            average: 0.0,
            total: 0,
        }
    }
}

/// Most slices one report will lay out.
pub const MAX_BUCKETS: i64 = 1_000_000;

/// Largest epoch second that still converts exactly to and from `f64`.
const MAX_EPOCH_SECS: f64 = 9_007_199_254_740_992.0;

/// Start of the slice holding `t`, aligned to `resolution`.
fn slice_of(t: f64, resolution: i64) -> Result<i64> {
    let secs = t.floor();
    if secs.abs() > MAX_EPOCH_SECS {
        return Err(Error::InvalidOption(format!(
            "timestamp {t:e} is outside the range a timed report can cover"
        )));
    }
    Ok((secs as i64).div_euclid(resolution) * resolution)
}

impl Analyzer for TimedAnalyzer {
    type Output = TimedReport;

    fn analyze(&self, requests: &[Request]) -> Result<Self::Output> {
        if self.resolution == 0 {
            return Err(Error::InvalidOption(
                "resolution must be at least 1 second".to_string(),
            ));
        }
        let resolution = i64::from(self.resolution);

        let hits: Vec<&Request> = requests.iter().filter(|r| !r.is_startup()).collect();

        let data_start = hits.iter().map(|r| r.start).reduce(f64::min);
        let data_end = hits
            .iter()
            .map(|r| r.t_end.unwrap_or(r.start))
            .reduce(f64::max);

        // No requests means no report, even when the window fixes both ends.
        let (Some(data_start), Some(data_end)) = (data_start, data_end) else {
            return Ok(TimedReport::empty(self.resolution, &self.window));
        };
        let start = self.window.start.unwrap_or(data_start);
        let end = self.window.end.unwrap_or(data_end);

        let first = slice_of(start, resolution)?;
        let last = slice_of(end, resolution)?;
        let slices = if last >= first {
            (last - first) / resolution + 1
        } else {
            0
        };
        if slices > MAX_BUCKETS {
            return Err(Error::InvalidOption(format!(
                "{slices} time slices at {resolution}s resolution exceeds the limit of \
                 {MAX_BUCKETS}; use a coarser resolution or a narrower date range"
            )));
        }

        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for request in hits.iter().filter(|r| r.start >= start && r.start <= end) {
            *counts.entry(slice_of(request.start, resolution)?).or_default() += 1;
        }

        let mut buckets = Vec::with_capacity(slices as usize);
        let mut peak = 0;
        let mut total = 0;
        let mut average: Option<f64> = None;

        for at in (0..slices).map(|i| first + i * resolution) {
            let count = counts.get(&at).copied().unwrap_or(0);
            peak = peak.max(count);
            total += count;
            average = Some(match average {
                None => count as f64,
                Some(avg) => (avg + count as f64) / 2.0,
            });
            buckets.push(TimeBucket { start: at, count });
        }

        tracing::info!(
            "Timed analysis complete: {} buckets, {} requests",
            buckets.len(),
            total
        );

        Ok(TimedReport {
            start,
            end,
            resolution: self.resolution,
            buckets,
            peak,
            average: average.unwrap_or(0.0),
            total,
        })
    }
}
