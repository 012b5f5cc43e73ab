use anyhow::Result;
use clap::Args;
use reqprof_core::merge::StreamMerger;
use reqprof_core::snapshot::SnapshotStore;
use reqprof_core::source::TraceSource;
use reqprof_core::tracker::reconstruct;
use reqprof_core::window::{TimeWindow, parse_date};
use reqprof_core::{Error, Request};
use std::path::PathBuf;

/// Where requests come from and which time range to keep.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Trace log files to merge (files ending in .gz are decompressed)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Read requests saved by an earlier --write-stats run instead of parsing logs
    #[arg(long, value_name = "PATH", conflicts_with = "write_stats")]
    pub read_stats: Option<PathBuf>,

    /// Save the parsed requests so later runs can use --read-stats
    #[arg(long, value_name = "PATH")]
    pub write_stats: Option<PathBuf>,

    /// Ignore events before this local time (YYYY/MM/DD HH:MM:SS)
    #[arg(long, value_name = "DATE", conflicts_with_all = ["today", "days_ago"])]
    pub start: Option<String>,

    /// Stop at the first event after this local time (YYYY/MM/DD HH:MM:SS)
    #[arg(long, value_name = "DATE", conflicts_with_all = ["today", "days_ago"])]
    pub end: Option<String>,

    /// Only use events from today (local time)
    #[arg(long, conflicts_with = "days_ago")]
    pub today: bool,

    /// Only use events from the day N days ago (local time)
    #[arg(long, value_name = "N")]
    pub days_ago: Option<u32>,
}

impl InputArgs {
    /// Resolve the date flags into a time window
    pub fn window(&self) -> reqprof_core::Result<TimeWindow> {
        if self.today {
            return TimeWindow::today();
        }
        if let Some(days) = self.days_ago {
            return TimeWindow::days_ago(days);
        }

        let start = self.start.as_deref().map(parse_date).transpose()?;
        let end = self.end.as_deref().map(parse_date).transpose()?;
        Ok(TimeWindow::new(start, end))
    }
}

/// Produce the request collection, from a stats file or by parsing logs.
///
/// The time window only filters freshly parsed logs; a stats file is used as-is.
pub fn load_requests(input: &InputArgs, window: &TimeWindow) -> Result<Vec<Request>> {
    if let Some(path) = &input.read_stats {
        if !window.is_unbounded() {
            tracing::warn!("Date limits are not applied to requests read from a stats file");
        }
        return Ok(SnapshotStore::from_file(path)?);
    }

    if input.files.is_empty() {
        return Err(Error::MissingInput.into());
    }

    tracing::debug!("Merging {} trace logs", input.files.len());
    let sources = TraceSource::open_all(&input.files)?;
    let mut merger = StreamMerger::new(sources);
    let requests = reconstruct(merger.by_ref(), window)?;

    if merger.skipped() > 0 {
        tracing::warn!("Skipped {} corrupt trace lines", merger.skipped());
    }
    // Close the inputs before writing anything.
    drop(merger);

    if let Some(path) = &input.write_stats {
        SnapshotStore::to_file(&requests, path)?;
    }

    Ok(requests)
}
