// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Output file: {dir}/training.csv
//
// Example:
//   epoch,train_loss,train_acc,val_loss,val_acc
//   1,2.124500,0.231000,2.089200,0.248000
//   2,1.890100,0.314000,1.854300,0.322000
//
// The file is opened in append mode so metrics accumulate across
// runs; pass `overwrite = true` to start a fresh log instead.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::history::EpochRecord;

const LOG_FILE: &str = "training.csv";
const HEADER: &str = "epoch,train_loss,train_acc,val_loss,val_acc";

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger under `dir`, writing the CSV header if the
    /// file is new (or is being overwritten).
    pub fn new(dir: impl Into<PathBuf>, overwrite: bool) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join(LOG_FILE);
        if overwrite || !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new CSV row.
    pub fn log(&self, record: &EpochRecord) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            record.epoch,
            record.train_loss,
            record.train_acc,
            record.val_loss,
            record.val_acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
