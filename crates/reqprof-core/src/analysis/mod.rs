mod cumulative;
mod timed;
mod urlfocus;

pub use cumulative::{Cumulative, CumulativeAnalyzer, CumulativeSummary};
pub use timed::{TimeBucket, TimedAnalyzer, TimedReport};
pub use urlfocus::{FocusOccurrence, Neighbor, NeighborTally, UrlFocusAnalyzer, UrlFocusReport};

use crate::request::Request;

/// A reduction of the reconstructed request collection into one report.
pub trait Analyzer {
    type Output;

    fn analyze(&self, requests: &[Request]) -> crate::Result<Self::Output>;
}
