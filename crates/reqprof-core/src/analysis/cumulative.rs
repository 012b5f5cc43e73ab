use super::Analyzer;
use crate::Result;
use crate::request::Request;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Elapsed-time rollup for every request to one URL.
///
/// Every derived statistic is 0 when no request to the URL finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cumulative {
    pub url: String,
    /// Requests that never reached their end event.
    pub hangs: usize,
    times: Vec<f64>,
}

impl Cumulative {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hangs: 0,
            times: Vec::new(),
        }
    }

    pub fn put(&mut self, request: &Request) {
        match request.elapsed {
            Some(elapsed) => self.times.push(elapsed),
            None => self.hangs += 1,
        }
    }

    /// Elapsed times in the order they were recorded.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn hits(&self) -> usize {
        self.times.len()
    }

    pub fn total(&self) -> f64 {
        self.times.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.times.iter().copied().reduce(f64::max).unwrap_or(0.0)
    }

    pub fn min(&self) -> f64 {
        self.times.iter().copied().reduce(f64::min).unwrap_or(0.0)
    }

    pub fn mean(&self) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        self.total() / self.hits() as f64
    }

    pub fn median(&self) -> f64 {
        let mut sorted = self.times.clone();
        sorted.sort_by(f64::total_cmp);

        let len = sorted.len();
        match len {
            0 => 0.0,
            _ if len % 2 == 1 => sorted[len / 2],
            _ => (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0,
        }
    }

    pub fn summary(&self) -> CumulativeSummary {
        CumulativeSummary {
            url: self.url.clone(),
            hangs: self.hangs,
            hits: self.hits(),
            total: self.total(),
            max: self.max(),
            min: self.min(),
            median: self.median(),
            mean: self.mean(),
        }
    }
}

/// Flattened statistics for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeSummary {
    pub url: String,
    pub hangs: usize,
    pub hits: usize,
    pub total: f64,
    pub max: f64,
    pub min: f64,
    pub median: f64,
    pub mean: f64,
}

/// Groups requests by URL. Startup markers are left out.
pub struct CumulativeAnalyzer;

impl Analyzer for CumulativeAnalyzer {
    type Output = Vec<Cumulative>;

    fn analyze(&self, requests: &[Request]) -> Result<Self::Output> {
        tracing::debug!("Building cumulative statistics for {} requests", requests.len());

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Cumulative> = Vec::new();

        for request in requests.iter().filter(|r| !r.is_startup()) {
            let slot = *index.entry(request.url.as_str()).or_insert_with(|| {
                groups.push(Cumulative::new(request.url.clone()));
                groups.len() - 1
            });
            groups[slot].put(request);
        }

        tracing::info!("Cumulative analysis complete: {} distinct URLs", groups.len());
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::decode_line;

    fn with_times(times: &[f64]) -> Cumulative {
        Cumulative {
            url: "/t".to_string(),
            hangs: 0,
            times: times.to_vec(),
        }
    }

    #[test]
    fn test_median() {
        assert_eq!(with_times(&[1.0, 2.0, 3.0]).median(), 2.0);
        assert_eq!(with_times(&[4.0, 1.0, 3.0, 2.0]).median(), 2.5);
        assert_eq!(with_times(&[]).median(), 0.0);
        assert_eq!(with_times(&[5.0]).median(), 5.0);
    }

    #[test]
    fn test_empty_group_reports_zeroes() {
        let mut stats = Cumulative::new("/hung");
        let begun = decode_line("B 1 1 0 GET /hung").unwrap().unwrap();
        stats.put(&Request::begin(&begun).unwrap());

        assert_eq!(stats.hangs, 1);
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.total(), 0.0);
        assert_eq!(stats.max(), 0.0);
        assert_eq!(stats.min(), 0.0);
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.median(), 0.0);
    }

    #[test]
    fn test_derived_stats() {
        let stats = with_times(&[0.5, 2.0, 1.5]);
        assert_eq!(stats.hits(), 3);
        assert_eq!(stats.total(), 4.0);
        assert_eq!(stats.max(), 2.0);
        assert_eq!(stats.min(), 0.5);
        assert!((stats.mean() - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.median(), 1.5);
    }

    #[test]
    fn test_groups_by_url_and_skips_startup_markers() {
        let mut finished = Request::begin(&decode_line("B 1 1 0 GET /a").unwrap().unwrap()).unwrap();
        finished.elapsed = Some(1.0);
        let hung = Request::begin(&decode_line("B 1 2 0 GET /a").unwrap().unwrap()).unwrap();
        let other = Request::begin(&decode_line("B 1 3 0 GET /b").unwrap().unwrap()).unwrap();
        let marker = Request::startup("/a", 5.0);

        let groups = CumulativeAnalyzer
            .analyze(&[finished, hung, other, marker])
            .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].url, "/a");
        assert_eq!(groups[0].hits(), 1);
        assert_eq!(groups[0].hangs, 1);
        assert_eq!(groups[1].url, "/b");
        assert_eq!(groups[1].hangs, 1);
    }

    #[test]
    fn test_empty_collection() {
        assert!(CumulativeAnalyzer.analyze(&[]).unwrap().is_empty());
    }
}
