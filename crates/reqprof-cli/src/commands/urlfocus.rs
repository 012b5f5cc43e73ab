use super::input::{InputArgs, load_requests};
use super::output_json;
use crate::OutputFormat;
use anyhow::Result;
use reqprof_core::analysis::{Analyzer, UrlFocusAnalyzer};
use reqprof_core::report::write_url_focus;
use std::io::{self, Write};

pub fn execute(input: &InputArgs, url: &str, window: u32, format: OutputFormat) -> Result<()> {
    let time_window = input.window()?;
    let requests = load_requests(input, &time_window)?;

    let mut out = io::stdout().lock();
    if requests.is_empty() {
        writeln!(out, "No data.")?;
        return Ok(());
    }

    tracing::info!("Focusing on {} with a {}s window", url, window);
    let report = UrlFocusAnalyzer::new(url, f64::from(window)).analyze(&requests)?;

    match format {
        OutputFormat::Json => output_json(&mut out, &report)?,
        OutputFormat::Pretty => write_url_focus(&mut out, &report)?,
    }

    Ok(())
}
