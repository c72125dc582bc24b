// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Forward-only pass over a dataset: mean cross-entropy loss over
// batches and fraction-correct accuracy. Never mutates the model,
// so repeated runs over the same data produce identical scalars.

use std::sync::Arc;

use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::CifarDataset,
};
use crate::ml::model::Cnn;

/// Scalar outcome of one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Mean cross-entropy loss over batches.
    pub loss: f64,

    /// Fraction of samples classified correctly, in [0, 1].
    pub accuracy: f64,
}

/// Evaluate a model over a dataset in batches of `batch_size`.
pub fn evaluate<B: Backend>(
    model: &Cnn<B>,
    dataset: CifarDataset,
    batch_size: usize,
    device: &B::Device,
) -> Evaluation {
    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);
    run_pass(model, &loader)
}

/// Shared pass over a prebuilt loader; the trainer reuses this for
/// the per-epoch validation sweep.
pub(crate) fn run_pass<B: Backend>(
    model: &Cnn<B>,
    loader: &Arc<dyn DataLoader<ImageBatch<B>>>,
) -> Evaluation {
    let mut loss_sum = 0.0f64;
    let mut batches = 0usize;
    let mut correct = 0usize;
    let mut total = 0usize;

    for batch in loader.iter() {
        let targets = batch.targets.clone();
        let (loss, logits) = model.forward_loss(batch.images, batch.targets);

        loss_sum += loss.into_scalar().elem::<f64>();
        batches += 1;

        // argmax(1) returns [batch, 1] — flatten before comparing
        let predictions = logits.argmax(1).flatten::<1>(0, 1);
        total += targets.dims()[0];
        correct += predictions
            .equal(targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;
    }

    Evaluation {
        loss: if batches > 0 {
            loss_sum / batches as f64
        } else {
            f64::NAN
        },
        accuracy: if total > 0 {
            correct as f64 / total as f64
        } else {
            0.0
        },
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::dataset::{CifarSample, IMAGE_PIXELS};
    use crate::domain::labels;
    use crate::ml::model::CnnConfig;

    type TestBackend = burn::backend::NdArray;

    fn dataset(count: usize) -> CifarDataset {
        let samples = (0..count)
            .map(|i| CifarSample {
                image: (0..IMAGE_PIXELS)
                    .map(|p| ((i * 31 + p) % 256) as f32 / 255.0)
                    .collect(),
                label: labels::one_hot(i % 10, 10),
            })
            .collect();
        CifarDataset::new(samples)
    }

    #[test]
    fn evaluation_is_idempotent() {
        let device = Default::default();
        let model: Cnn<TestBackend> = CnnConfig::new(10).init(&device);
        let data = dataset(6);

        let first = evaluate(&model, data.clone(), 4, &device);
        let second = evaluate(&model, data, 4, &device);
        assert_eq!(first, second);

        assert!(first.loss.is_finite());
        assert!((0.0..=1.0).contains(&first.accuracy));
    }
}
