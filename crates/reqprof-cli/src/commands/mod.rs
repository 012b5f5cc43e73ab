pub mod completion;
pub mod cumulative;
pub mod detailed;
pub mod input;
pub mod timed;
pub mod urlfocus;

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

fn output_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Number of rows to show for a `--top` value (0 = all).
fn row_limit(top: usize, len: usize) -> usize {
    if top > 0 { top.min(len) } else { len }
}
