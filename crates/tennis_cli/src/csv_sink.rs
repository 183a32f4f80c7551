//! CSV point-log sink
//!
//! Appends exported batches to a single CSV file. The header (with the
//! players' names in the probability columns) is written only when the
//! file is new or empty, so repeated runs keep appending to one log.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tennis_core::engine::header_for;
use tennis_core::{BatchLog, PerSide, Player, PointLogSink, Side, SinkError};

/// Thread-safe CSV writer shared by all workers.
pub struct CsvPointLogSink {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
    rows_written: AtomicU64,
}

impl CsvPointLogSink {
    /// Open `path` for appending, creating it (and its parent directory) if needed.
    pub fn open(path: &Path, players: &PerSide<Player>) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open point log: {}", path.display()))?;
        let is_empty = file
            .metadata()
            .with_context(|| format!("Failed to stat point log: {}", path.display()))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_empty {
            writer
                .write_record(header_for(
                    &players[Side::Player1].name,
                    &players[Side::Player2].name,
                ))
                .context("Failed to write point log header")?;
            writer.flush().context("Failed to flush point log header")?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
            rows_written: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows appended by this sink (header excluded).
    pub fn rows_written(&self) -> u64 {
        self.rows_written.load(Ordering::Relaxed)
    }
}

impl PointLogSink for CsvPointLogSink {
    fn export(&self, log: &BatchLog) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Rejected {
            batch: log.batch_index,
            message: "point log writer poisoned".to_string(),
        })?;
        for record in &log.records {
            writer.serialize(record).map_err(io::Error::from)?;
        }
        writer.flush()?;
        self.rows_written
            .fetch_add(log.records.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}
