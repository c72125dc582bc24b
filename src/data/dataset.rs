use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::labels;

/// Image side length in pixels; CIFAR-10 images are square.
pub const IMAGE_SIDE: usize = 32;
/// Color channels per image.
pub const CHANNELS: usize = 3;
/// Floats per image in channel-major (CHW) order.
pub const IMAGE_PIXELS: usize = CHANNELS * IMAGE_SIDE * IMAGE_SIDE;

/// One normalized image with its one-hot label.
/// Pixels are stored channel-major (all red rows, then green, then blue),
/// matching the on-disk record layout, with values scaled into [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CifarSample {
    pub image: Vec<f32>,
    pub label: Vec<f32>,
}

impl CifarSample {
    /// The integer class index encoded by the one-hot label.
    pub fn class(&self) -> usize {
        labels::class_index(&self.label)
    }
}

#[derive(Debug, Clone)]
pub struct CifarDataset {
    samples: Vec<CifarSample>,
}

impl CifarDataset {
    pub fn new(samples: Vec<CifarSample>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<CifarSample> for CifarDataset {
    fn get(&self, index: usize) -> Option<CifarSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
