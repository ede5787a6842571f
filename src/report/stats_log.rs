use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::simulation::statistics::TickStatistics;

/// Errors that can occur while writing the statistics log.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One line of the statistics log.
#[derive(Debug, Clone, Serialize)]
pub struct StatsRecord<'a> {
    #[serde(flatten)]
    pub statistics: &'a TickStatistics,
    /// Rebellion ratio above the configured report threshold.
    pub reported: bool,
}

/// Per-tick statistics written as JSON Lines.
pub struct StatsLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl StatsLog {
    /// Create (or truncate) the log at `path`, creating parent directories.
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        let io_err = |source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one tick and flush, so the file is readable while running.
    pub fn append(
        &mut self,
        statistics: &TickStatistics,
        report_threshold: f64,
    ) -> Result<(), ReportError> {
        let record = StatsRecord {
            statistics,
            reported: statistics.counts.is_reported(report_threshold),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .map_err(|source| ReportError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
