use crate::request::Request;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Bumped whenever the persisted [`Request`] layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    requests: &'a [Request],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    version: u32,
    requests: Vec<Request>,
}

/// Persists reconstructed requests so later runs can skip log parsing.
pub struct SnapshotStore;

impl SnapshotStore {
    /// Write the request collection to a stats file
    pub fn to_file(requests: &[Request], path: &Path) -> Result<()> {
        tracing::debug!("Writing stats file to: {}", path.display());

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &Self::envelope(requests))?;
        writer.flush()?;

        tracing::info!(
            "Wrote {} requests to stats file {}",
            requests.len(),
            path.display()
        );

        Ok(())
    }

    /// Read a request collection from a stats file
    pub fn from_file(path: &Path) -> Result<Vec<Request>> {
        tracing::debug!("Reading stats file from: {}", path.display());

        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: SnapshotOwned = serde_json::from_reader(BufReader::new(file))?;
        let requests = Self::unwrap(snapshot)?;

        tracing::info!("Loaded {} requests from stats file", requests.len());

        Ok(requests)
    }

    /// Serialize the request collection to a JSON string
    pub fn to_string(requests: &[Request]) -> Result<String> {
        Ok(serde_json::to_string(&Self::envelope(requests))?)
    }

    /// Parse a request collection from a JSON string
    pub fn from_str(content: &str) -> Result<Vec<Request>> {
        let snapshot: SnapshotOwned = serde_json::from_str(content)?;
        Self::unwrap(snapshot)
    }

    fn envelope(requests: &[Request]) -> SnapshotRef<'_> {
        SnapshotRef {
            version: SNAPSHOT_VERSION,
            requests,
        }
    }

    fn unwrap(snapshot: SnapshotOwned) -> Result<Vec<Request>> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::UnsupportedSnapshot(snapshot.version));
        }
        Ok(snapshot.requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::decode_line;
    use crate::tracker::reconstruct;
    use crate::window::TimeWindow;
    use tempfile::TempDir;

    fn sample() -> Vec<Request> {
        let lines = [
            "U 1 - 1000000000.125 Zope Ready to handle requests",
            "B 1 a 1000000001.1 GET /index_html",
            "I 1 a 1000000001.2 512",
            "A 1 a 1000000001.333333 200 4096",
            "E 1 a 1000000001.7",
            "B 1 b 1000000002.0 POST /manage_edit",
            "A 1 b 1000000003.0 500 12",
        ];
        let events = lines.iter().map(|l| Ok(decode_line(l).unwrap().unwrap()));
        reconstruct(events, &TimeWindow::default()).unwrap()
    }

    #[test]
    fn test_file_round_trip_preserves_every_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requests.stat");
        let requests = sample();

        SnapshotStore::to_file(&requests, &path).unwrap();
        let loaded = SnapshotStore::from_file(&path).unwrap();

        assert_eq!(loaded, requests);
        assert_eq!(loaded[1].elapsed, requests[1].elapsed);
        assert!(loaded[0].is_startup());
    }

    #[test]
    fn test_string_round_trip() {
        let requests = sample();
        let json = SnapshotStore::to_string(&requests).unwrap();
        assert!(json.contains("\"version\":1"));
        assert_eq!(SnapshotStore::from_str(&json).unwrap(), requests);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let err = SnapshotStore::from_str(r#"{"version": 99, "requests": []}"#).unwrap_err();
        assert!(matches!(err, Error::UnsupportedSnapshot(99)));
    }

    #[test]
    fn test_missing_stats_file() {
        let err = SnapshotStore::from_file(Path::new("/no/such/requests.stat")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }
}
