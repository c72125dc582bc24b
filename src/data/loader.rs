// ============================================================
// Layer 4 — CIFAR-10 Loader
// ============================================================
// Reads the CIFAR-10 binary batch files from a local directory.
//
// On-disk format (cifar-10-binary.tar.gz, extracted):
//   data_batch_1.bin .. data_batch_5.bin   10,000 records each
//   test_batch.bin                         10,000 records
//
// Each record is 3073 bytes: one label byte in [0, 9] followed by
// 3072 pixel bytes — 1024 red, 1024 green, 1024 blue, row-major.
//
// Contract: pixels are cast to f32 and divided by 255 so every
// value lands in [0, 1]; labels are validated against the class
// count and expanded to one-hot vectors. Any I/O or format problem
// (missing file, truncated record, label out of range) is an error
// surfaced to the caller, never skipped.

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};

use crate::data::dataset::{CifarDataset, CifarSample, IMAGE_PIXELS};
use crate::domain::labels;

/// CIFAR-10 has ten classes.
pub const NUM_CLASSES: usize = 10;

const RECORD_LEN: usize = 1 + IMAGE_PIXELS;

const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const TEST_FILE: &str = "test_batch.bin";

const ARCHIVE_URL: &str = "https://www.cs.toronto.edu/~kriz/cifar-10-binary.tar.gz";

/// Loads the CIFAR-10 dataset from an extracted binary archive.
pub struct CifarLoader {
    dir: PathBuf,
    classes: usize,
}

impl CifarLoader {
    pub fn new(dir: impl Into<PathBuf>, classes: usize) -> Self {
        Self {
            dir: dir.into(),
            classes,
        }
    }

    /// Load the full dataset: (training set, test set).
    pub fn load(&self) -> Result<(CifarDataset, CifarDataset)> {
        Ok((self.load_train()?, self.load_test()?))
    }

    /// Load the 50,000-image training set.
    pub fn load_train(&self) -> Result<CifarDataset> {
        let mut samples = Vec::new();
        for name in TRAIN_FILES {
            samples.extend(self.load_file(name)?);
        }
        tracing::info!("Loaded {} training images", samples.len());
        Ok(CifarDataset::new(samples))
    }

    /// Load the 10,000-image held-out test set.
    pub fn load_test(&self) -> Result<CifarDataset> {
        let samples = self.load_file(TEST_FILE)?;
        tracing::info!("Loaded {} test images", samples.len());
        Ok(CifarDataset::new(samples))
    }

    fn load_file(&self, name: &str) -> Result<Vec<CifarSample>> {
        let path = self.dir.join(name);
        let bytes = fs::read(&path).with_context(|| {
            format!(
                "Cannot read dataset file '{}'. Download and extract {} into '{}'.",
                path.display(),
                ARCHIVE_URL,
                self.dir.display()
            )
        })?;
        parse_records(&bytes, self.classes)
            .with_context(|| format!("Corrupt dataset file '{}'", path.display()))
    }
}

/// Decode a batch file's bytes into normalized, one-hot-labelled samples.
fn parse_records(bytes: &[u8], classes: usize) -> Result<Vec<CifarSample>> {
    if bytes.is_empty() || bytes.len() % RECORD_LEN != 0 {
        bail!(
            "file length {} is not a multiple of the {}-byte record size",
            bytes.len(),
            RECORD_LEN
        );
    }

    let mut samples = Vec::with_capacity(bytes.len() / RECORD_LEN);
    for record in bytes.chunks_exact(RECORD_LEN) {
        let label = record[0] as usize;
        if label >= classes {
            bail!("label byte {label} exceeds the class count {classes}");
        }

        let image: Vec<f32> = record[1..].iter().map(|&b| f32::from(b) / 255.0).collect();
        samples.push(CifarSample {
            image,
            label: labels::one_hot(label, classes),
        });
    }
    Ok(samples)
}
