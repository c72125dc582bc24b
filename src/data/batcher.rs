// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<CifarSample>
// into tensors for one forward/backward pass.
//
// The training batcher carries an Augmenter and draws fresh
// random transforms for every sample of every batch, so each
// epoch's pass over the DataLoader sees newly augmented images.
// The evaluation batcher carries none and stacks samples as-is.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::augment::Augmenter;
use crate::data::dataset::{CifarSample, CHANNELS, IMAGE_PIXELS, IMAGE_SIDE};

/// A batch of images ready for the model.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Pixel data — shape: [batch_size, 3, 32, 32]
    pub images: Tensor<B, 4>,

    /// Class indices decoded from the one-hot labels — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    device: B::Device,
    augmenter: Option<Augmenter>,
}

impl<B: Backend> ImageBatcher<B> {
    /// Batcher for evaluation: samples pass through untouched.
    pub fn new(device: B::Device) -> Self {
        Self {
            device,
            augmenter: None,
        }
    }

    /// Batcher for training: every sample gets an independent
    /// random transform before stacking.
    pub fn with_augmenter(device: B::Device, augmenter: Augmenter) -> Self {
        Self {
            device,
            augmenter: Some(augmenter),
        }
    }
}

impl<B: Backend> Batcher<CifarSample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<CifarSample>) -> ImageBatch<B> {
        let batch_size = items.len();
        let mut rng = rand::thread_rng();

        let mut pixels: Vec<f32> = Vec::with_capacity(batch_size * IMAGE_PIXELS);
        let mut classes: Vec<i32> = Vec::with_capacity(batch_size);

        for item in &items {
            match &self.augmenter {
                Some(augmenter) => pixels.extend(augmenter.transform(&item.image, &mut rng)),
                None => pixels.extend_from_slice(&item.image),
            }
            classes.push(item.class() as i32);
        }

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device).reshape([
            batch_size,
            CHANNELS,
            IMAGE_SIDE,
            IMAGE_SIDE,
        ]);
        let targets = Tensor::<B, 1, Int>::from_ints(classes.as_slice(), &self.device);

        ImageBatch { images, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::data::dataloader::DataLoaderBuilder;

    use crate::data::dataset::CifarDataset;
    use crate::domain::labels;

    type TestBackend = burn::backend::NdArray;

    fn samples(count: usize) -> Vec<CifarSample> {
        (0..count)
            .map(|i| CifarSample {
                image: vec![0.5; IMAGE_PIXELS],
                label: labels::one_hot(i % 10, 10),
            })
            .collect()
    }

    #[test]
    fn batch_has_expected_shapes_and_targets() {
        let device = Default::default();
        let batcher = ImageBatcher::<TestBackend>::new(device);
        let batch = batcher.batch(samples(3));

        assert_eq!(batch.images.dims(), [3, CHANNELS, IMAGE_SIDE, IMAGE_SIDE]);
        assert_eq!(batch.targets.dims(), [3]);

        let targets: Vec<i64> = batch.targets.into_data().to_vec().unwrap();
        assert_eq!(targets, vec![0, 1, 2]);
    }

    #[test]
    fn dataloader_yields_ceil_n_over_b_batches() {
        // 10 samples at batch size 4 → 3 batches, the last of size 2.
        let device = Default::default();
        let loader = DataLoaderBuilder::new(ImageBatcher::<TestBackend>::new(device))
            .batch_size(4)
            .num_workers(1)
            .build(CifarDataset::new(samples(10)));

        let sizes: Vec<usize> = loader.iter().map(|batch| batch.targets.dims()[0]).collect();
        assert_eq!(sizes, vec![4, 4, 2]);

        // The loader restarts: a second pass yields the same batch count.
        assert_eq!(loader.iter().count(), 3);
    }

    #[test]
    fn augmenting_batcher_keeps_pixels_normalized() {
        let device = Default::default();
        let batcher =
            ImageBatcher::<TestBackend>::with_augmenter(device, Augmenter::default());
        let batch = batcher.batch(samples(2));

        let pixels: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        assert_eq!(pixels.len(), 2 * IMAGE_PIXELS);
        assert!(pixels.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
