//! Report delivery.
//!
//! The exporter never touches the filesystem itself; it hands a finished
//! [`Report`] to a [`ReportSink`].

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::export::Report;

/// Report delivery error.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Generated file name would escape the target directory.
    #[error("report file name {0:?} is not a plain file name")]
    InvalidFilename(String),

    /// Writing the report failed.
    #[error("failed to write report to {}: {source}", target.display())]
    Io {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Written to this file.
    File(PathBuf),
    /// Streamed to a writer.
    Stream,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stream => write!(f, "<stream>"),
        }
    }
}

/// Receives finished reports.
pub trait ReportSink {
    fn deliver(&mut self, report: &Report) -> Result<Delivery, DeliveryError>;
}

// ─── DirectorySink ──────────────────────────────────────────────────

/// Writes each report to `<dir>/<report.filename>`, creating `dir` if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for DirectorySink {
    fn deliver(&mut self, report: &Report) -> Result<Delivery, DeliveryError> {
        let name = Path::new(&report.filename);
        if name.file_name() != Some(name.as_os_str()) {
            return Err(DeliveryError::InvalidFilename(report.filename.clone()));
        }

        std::fs::create_dir_all(&self.dir).map_err(|source| DeliveryError::Io {
            target: self.dir.clone(),
            source,
        })?;
        let target = self.dir.join(name);
        std::fs::write(&target, report.content.as_bytes()).map_err(|source| {
            DeliveryError::Io {
                target: target.clone(),
                source,
            }
        })?;
        Ok(Delivery::File(target))
    }
}

// ─── WriterSink ─────────────────────────────────────────────────────

/// Streams report content to any writer (stdout, a buffer, ...).
///
/// The file name is not written.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn deliver(&mut self, report: &Report) -> Result<Delivery, DeliveryError> {
        let to_io = |source: std::io::Error| DeliveryError::Io {
            target: PathBuf::from(&report.filename),
            source,
        };
        self.writer
            .write_all(report.content.as_bytes())
            .map_err(to_io)?;
        self.writer.flush().map_err(to_io)?;
        Ok(Delivery::Stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(filename: &str) -> Report {
        Report {
            filename: filename.to_string(),
            content: "Pin Name,Physical Number,Type,Configured Function\nPA1,1,gpio,".to_string(),
        }
    }

    #[test]
    fn directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("reports"));

        let delivery = sink.deliver(&report("Chip_PinMux_x.csv")).unwrap();
        let expected = dir.path().join("reports").join("Chip_PinMux_x.csv");
        assert_eq!(delivery, Delivery::File(expected.clone()));
        assert_eq!(
            std::fs::read_to_string(expected).unwrap(),
            report("").content
        );
    }

    #[test]
    fn directory_sink_rejects_nested_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let result = sink.deliver(&report("../escape.csv"));
        assert!(matches!(result, Err(DeliveryError::InvalidFilename(_))));
    }

    #[test]
    fn writer_sink_streams_content_only() {
        let mut sink = WriterSink::new(Vec::new());
        assert_eq!(sink.deliver(&report("a.csv")).unwrap(), Delivery::Stream);
        assert_eq!(
            String::from_utf8(sink.into_inner()).unwrap(),
            report("a.csv").content
        );
    }
}
