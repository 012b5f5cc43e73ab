//! Plain-text rendering of computed reports.

use crate::analysis::{Cumulative, TimedReport, UrlFocusReport};
use crate::request::Request;
use crate::window::{format_time_of_day, format_timestamp};
use std::io::{self, Write};

/// Width rows are cut to unless verbose output is requested.
pub const LINE_WIDTH: usize = 78;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Stop after this many rows; 0 means all.
    pub top: usize,
    /// Print rows in full instead of cutting them to [`LINE_WIDTH`].
    pub verbose: bool,
}

/// A row type that can be printed as a fixed-column table.
pub trait TableRow {
    fn header() -> String;
    fn row(&self) -> String;
}

impl TableRow for Request {
    fn header() -> String {
        format!(
            "{:>19} {:>5} {:>5} {:>5} {:>5} {:>1} {:>7} {:>4} {:>4} {}",
            "Start", "WIn", "WOut", "WEnd", "Tot", "S", "OSize", "Code", "Act", "URL"
        )
    }

    fn row(&self) -> String {
        format!(
            "{:>19} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>1} {:>7} {:>4} {:>4} {}",
            format_timestamp(self.start),
            self.win().unwrap_or(-1.0),
            self.wout().unwrap_or(-1.0),
            self.wend().unwrap_or(-1.0),
            self.total(),
            self.stage(),
            self.output_size.as_deref().unwrap_or("-1"),
            self.http_code.as_deref().unwrap_or("NA"),
            self.active,
            self.url
        )
    }
}

impl TableRow for Cumulative {
    fn header() -> String {
        format!(
            "{:>5} {:>5} {:>8} {:>5} {:>5} {:>5} {:>5} {}",
            "Hangs", "Hits", "Total", "Max", "Min", "Med", "Mean", "URL"
        )
    }

    fn row(&self) -> String {
        format!(
            "{:>5} {:>5} {:>8.2} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {}",
            self.hangs,
            self.hits(),
            self.total(),
            self.max(),
            self.min(),
            self.median(),
            self.mean(),
            self.url
        )
    }
}

/// Print a header and the rows, honoring `top` and `verbose`.
pub fn write_table<T: TableRow>(
    out: &mut impl Write,
    rows: &[T],
    options: &ReportOptions,
) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No data.");
    }

    writeln!(out, "{}", T::header())?;

    let limit = if options.top > 0 { options.top } else { rows.len() };
    for row in rows.iter().take(limit) {
        let line = row.row();
        if options.verbose {
            writeln!(out, "{}", line)?;
        } else {
            writeln!(out, "{}", truncate(&line, LINE_WIDTH))?;
        }
    }
    Ok(())
}

fn truncate(line: &str, width: usize) -> &str {
    match line.char_indices().nth(width) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

pub fn write_timed(out: &mut impl Write, report: &TimedReport) -> io::Result<()> {
    if report.is_empty() {
        return writeln!(out, "No data.");
    }

    let resolution = f64::from(report.resolution);

    writeln!(
        out,
        "Start: {}    End: {}   Resolution: {} secs",
        format_timestamp(report.start),
        format_timestamp(report.end),
        report.resolution
    )?;
    writeln!(out, "{}", "-".repeat(LINE_WIDTH))?;
    writeln!(out)?;
    writeln!(out, "Date/Time                #requests requests/second")?;

    for bucket in &report.buckets {
        writeln!(
            out,
            "{}     {:>6}         {:>4.2}",
            format_timestamp(bucket.start as f64),
            bucket.count,
            bucket.rate(report.resolution)
        )?;
    }

    writeln!(out, "{}", "=".repeat(LINE_WIDTH))?;
    writeln!(
        out,
        " Peak:                  {:>6}         {:>4.2}",
        report.peak,
        report.peak as f64 / resolution
    )?;
    writeln!(
        out,
        "  Avg:                  {:>6}         {:>4.2}",
        report.average as i64,
        report.average / resolution
    )?;
    writeln!(out, "Total:                  {:>6}          n/a ", report.total)
}

pub fn write_url_focus(out: &mut impl Write, report: &UrlFocusReport) -> io::Result<()> {
    for occurrence in &report.occurrences {
        writeln!(
            out,
            "URLs invoked {} seconds before and after {} (#{}, {})",
            report.window,
            report.url,
            occurrence.ordinal,
            format_time_of_day(occurrence.start)
        )?;
        writeln!(out, "---")?;
        for neighbor in &occurrence.neighbors {
            writeln!(
                out,
                "{:>3} {} {}",
                neighbor.offset as i64,
                format_time_of_day(neighbor.start),
                neighbor.url
            )?;
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "Summary of URLs invoked before (and at the same time as) {} (times, url)",
        report.url
    )?;
    for tally in &report.before {
        writeln!(out, "{}, {}", tally.times, tally.url)?;
    }
    writeln!(out)?;
    writeln!(out, "Summary of URLs invoked after {} (times, url)", report.url)?;
    for tally in &report.after {
        writeln!(out, "{}, {}", tally.times, tally.url)?;
    }
    Ok(())
}
