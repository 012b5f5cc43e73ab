use super::Analyzer;
use crate::Result;
use crate::request::Request;
use crate::sort::{DetailedSort, Sort};
use serde::Serialize;
use std::collections::BTreeMap;

/// What else was running around each hit on one URL.
pub struct UrlFocusAnalyzer {
    pub url: String,
    /// Half-width of the window around each occurrence, in seconds.
    pub window: f64,
}

impl UrlFocusAnalyzer {
    pub fn new(url: impl Into<String>, window: f64) -> Self {
        Self {
            url: url.into(),
            window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    /// Seconds relative to the focused occurrence; negative is earlier.
    pub offset: f64,
    pub start: f64,
    pub url: String,
    /// True for the focused occurrence itself.
    pub focus: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusOccurrence {
    /// 1-based occurrence number.
    pub ordinal: usize,
    pub start: f64,
    pub neighbors: Vec<Neighbor>,
}

/// How often the request at `position` (in start order) fell inside a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborTally {
    pub position: usize,
    pub url: String,
    pub times: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlFocusReport {
    pub url: String,
    pub window: f64,
    pub occurrences: Vec<FocusOccurrence>,
    /// Neighbors that started before or at the same time as the focus.
    pub before: Vec<NeighborTally>,
    /// Neighbors that started strictly after the focus.
    pub after: Vec<NeighborTally>,
}

impl Analyzer for UrlFocusAnalyzer {
    type Output = UrlFocusReport;

    fn analyze(&self, requests: &[Request]) -> Result<Self::Output> {
        let by_start = Sort::new(DetailedSort::Start);
        let mut ordered: Vec<&Request> = requests.iter().collect();
        ordered.sort_by(|a, b| by_start.compare(a, b));

        let focus_positions: Vec<usize> = ordered
            .iter()
            .enumerate()
            .filter(|(_, r)| r.url == self.url)
            .map(|(i, _)| i)
            .collect();

        tracing::debug!(
            "Found {} occurrences of {} among {} requests",
            focus_positions.len(),
            self.url,
            ordered.len()
        );

        let mut before: BTreeMap<usize, usize> = BTreeMap::new();
        let mut after: BTreeMap<usize, usize> = BTreeMap::new();
        let mut occurrences = Vec::with_capacity(focus_positions.len());

        for (ordinal, &focus) in focus_positions.iter().enumerate() {
            let center = ordered[focus].start;
            let earliest = center - self.window;
            let latest = center + self.window;
            let mut neighbors = Vec::new();

            for (position, request) in ordered.iter().enumerate() {
                if request.start < earliest {
                    continue;
                }
                if request.start > latest {
                    break;
                }
                if position != focus {
                    let tally = if request.start <= center {
                        &mut before
                    } else {
                        &mut after
                    };
                    *tally.entry(position).or_default() += 1;
                }
                neighbors.push(Neighbor {
                    offset: request.start - center,
                    start: request.start,
                    url: request.url.clone(),
                    focus: position == focus,
                });
            }

            occurrences.push(FocusOccurrence {
                ordinal: ordinal + 1,
                start: center,
                neighbors,
            });
        }

        let tallies = |counts: BTreeMap<usize, usize>| -> Vec<NeighborTally> {
            counts
                .into_iter()
                .map(|(position, times)| NeighborTally {
                    position,
                    url: ordered[position].url.clone(),
                    times,
                })
                .collect()
        };

        Ok(UrlFocusReport {
            url: self.url.clone(),
            window: self.window,
            occurrences,
            before: tallies(before),
            after: tallies(after),
        })
    }
}
