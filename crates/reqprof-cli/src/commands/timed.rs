use super::input::{InputArgs, load_requests};
use super::output_json;
use crate::OutputFormat;
use anyhow::Result;
use reqprof_core::analysis::{Analyzer, TimedAnalyzer, TimedReport};
use reqprof_core::report::write_timed;
use std::io;

/// Count requests per time slice over the input's date range
pub fn timed_report(input: &InputArgs, resolution: u32) -> Result<TimedReport> {
    let window = input.window()?;
    let requests = load_requests(input, &window)?;
    Ok(TimedAnalyzer::new(resolution, window).analyze(&requests)?)
}

pub fn execute(input: &InputArgs, resolution: u32, format: OutputFormat) -> Result<()> {
    tracing::info!("Building timed report at {}s resolution", resolution);

    let report = timed_report(input, resolution)?;

    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => output_json(&mut out, &report)?,
        OutputFormat::Pretty => write_timed(&mut out, &report)?,
    }

    Ok(())
}
