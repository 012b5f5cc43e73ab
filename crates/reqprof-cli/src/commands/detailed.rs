use super::input::{InputArgs, load_requests};
use super::{output_json, row_limit};
use crate::OutputFormat;
use anyhow::Result;
use reqprof_core::Request;
use reqprof_core::report::{ReportOptions, write_table};
use reqprof_core::sort::{DetailedSort, Sort};
use std::io;

pub fn execute(
    input: &InputArgs,
    sort: Option<&str>,
    options: ReportOptions,
    format: OutputFormat,
) -> Result<()> {
    let sort: Sort<DetailedSort> = match sort {
        Some(name) => Sort::parse(name)?,
        None => Sort::default(),
    };
    let window = input.window()?;

    let mut requests: Vec<Request> = load_requests(input, &window)?;
    tracing::info!("Building detailed report from {} requests", requests.len());
    sort.apply(&mut requests);

    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let limit = row_limit(options.top, requests.len());
            output_json(&mut out, &requests[..limit])?
        }
        OutputFormat::Pretty => write_table(&mut out, &requests, &options)?,
    }

    Ok(())
}
