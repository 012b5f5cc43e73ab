use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A named, line-oriented trace log ready to be merged.
pub struct TraceSource {
    pub name: String,
    pub reader: Box<dyn BufRead>,
}

impl TraceSource {
    /// Open a trace log, decompressing it on the fly when the name ends in `.gz`
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening trace log: {}", path.display());

        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(Self {
            name: path.display().to_string(),
            reader,
        })
    }

    /// Wrap an already-open reader (used by tests and stdin-style callers)
    pub fn from_reader(name: impl Into<String>, reader: impl BufRead + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// Open every path, failing on the first one that cannot be opened
    pub fn open_all(paths: &[impl AsRef<Path>]) -> Result<Vec<Self>> {
        paths.iter().map(|p| Self::open(p.as_ref())).collect()
    }
}
