use super::input::{InputArgs, load_requests};
use super::{output_json, row_limit};
use crate::OutputFormat;
use anyhow::Result;
use reqprof_core::Request;
use reqprof_core::analysis::{Analyzer, Cumulative, CumulativeAnalyzer, CumulativeSummary};
use reqprof_core::report::{ReportOptions, write_table};
use reqprof_core::sort::{CumulativeSort, Sort};
use std::io;

/// Group requests by URL and order the groups
pub fn cumulative_report(requests: &[Request], sort: Sort<CumulativeSort>) -> Result<Vec<Cumulative>> {
    let mut stats = CumulativeAnalyzer.analyze(requests)?;
    sort.apply(&mut stats);
    Ok(stats)
}

pub fn execute(
    input: &InputArgs,
    sort: Option<&str>,
    options: ReportOptions,
    format: OutputFormat,
) -> Result<()> {
    // Validate the sort before spending time on the logs.
    let sort = match sort {
        Some(name) => Sort::parse(name)?,
        None => Sort::default(),
    };
    let window = input.window()?;

    let requests = load_requests(input, &window)?;
    tracing::info!("Building cumulative report from {} requests", requests.len());

    let stats = cumulative_report(&requests, sort)?;

    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let summaries: Vec<CumulativeSummary> = stats
                .iter()
                .take(row_limit(options.top, stats.len()))
                .map(Cumulative::summary)
                .collect();
            output_json(&mut out, &summaries)?
        }
        OutputFormat::Pretty => write_table(&mut out, &stats, &options)?,
    }

    Ok(())
}
