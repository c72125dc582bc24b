// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop over Burn's DataLoader.
//
// Key backend split:
//   - Training runs on an AutodiffBackend for gradients
//   - model.valid() returns the model on the inner backend, where
//     dropout is inactive and no tape is recorded — the validation
//     loader therefore uses the inner backend too
//
// The learning rate follows the classic time-based schedule
// lr_t = lr0 / (1 + decay * t) with t counting gradient steps.
//
// Reference: Burn Book §5 (Training)

use std::time::Instant;

use anyhow::{bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{momentum::MomentumConfig, GradientsParams, Optimizer, RmsPropConfig, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::{OptimizerKind, TrainConfig};
use crate::data::{augment::Augmenter, batcher::ImageBatcher, dataset::CifarDataset};
use crate::domain::history::{EpochRecord, TrainingHistory};
use crate::infra::metrics::MetricsLogger;
use crate::ml::evaluator;
use crate::ml::model::{Cnn, CnnConfig};

/// Train a freshly initialized model and return it with the
/// per-epoch history. The validation set is swept once per epoch.
pub fn run_training<B: AutodiffBackend>(
    cfg: &TrainConfig,
    model_config: &CnnConfig,
    train_dataset: CifarDataset,
    val_dataset: CifarDataset,
    logger: &MetricsLogger,
    device: B::Device,
) -> Result<(Cnn<B>, TrainingHistory)> {
    B::seed(cfg.seed);
    let model: Cnn<B> = model_config.init(&device);

    match cfg.optimizer {
        OptimizerKind::Sgd => {
            // θ ← θ - lr * v,  v = momentum * v + g  (Nesterov lookahead)
            let optim = SgdConfig::new()
                .with_momentum(Some(
                    MomentumConfig::new()
                        .with_momentum(cfg.momentum)
                        .with_dampening(0.0)
                        .with_nesterov(true),
                ))
                .init();
            train_loop(cfg, model, optim, train_dataset, val_dataset, logger, device)
        }
        OptimizerKind::RmsProp => {
            let optim = RmsPropConfig::new().init();
            train_loop(cfg, model, optim, train_dataset, val_dataset, logger, device)
        }
    }
}

fn train_loop<B: AutodiffBackend, O: Optimizer<Cnn<B>, B>>(
    cfg: &TrainConfig,
    mut model: Cnn<B>,
    mut optim: O,
    train_dataset: CifarDataset,
    val_dataset: CifarDataset,
    logger: &MetricsLogger,
    device: B::Device,
) -> Result<(Cnn<B>, TrainingHistory)> {
    // ── Training data loader: reshuffled and re-augmented every epoch ─────────
    let train_batcher = ImageBatcher::<B>::with_augmenter(device.clone(), Augmenter::default());
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (inner backend — no autodiff overhead) ─────────
    let val_batcher = ImageBatcher::<B::InnerBackend>::new(device.clone());
    let val_loader = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let schedule = DecaySchedule::new(cfg.learning_rate, cfg.lr_decay);
    let mut history = TrainingHistory::new();
    let mut step = 0usize;
    let started = Instant::now();

    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut batches = 0usize;
        let mut correct = 0usize;
        let mut seen = 0usize;

        for batch in train_loader.iter() {
            let targets = batch.targets.clone();
            let (loss, logits) = model.forward_loss(batch.images, batch.targets);

            let loss_value: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_value.is_finite() {
                bail!("training diverged at epoch {epoch}: batch loss is {loss_value}");
            }
            loss_sum += loss_value;
            batches += 1;

            let predictions = logits.argmax(1).flatten::<1>(0, 1);
            seen += targets.dims()[0];
            correct += predictions
                .equal(targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>() as usize;

            // Backward pass + optimizer step at the decayed rate
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(schedule.learning_rate(step), model, grads);
            step += 1;
        }

        let train_loss = if batches > 0 {
            loss_sum / batches as f64
        } else {
            f64::NAN
        };
        let train_acc = if seen > 0 {
            correct as f64 / seen as f64
        } else {
            0.0
        };

        // ── Validation phase ──────────────────────────────────────────────────
        let validation = evaluator::run_pass(&model.valid(), &val_loader);

        let record = EpochRecord {
            epoch,
            train_loss,
            train_acc,
            val_loss: validation.loss,
            val_acc: validation.accuracy,
        };
        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
            epoch,
            cfg.epochs,
            record.train_loss,
            record.train_acc * 100.0,
            record.val_loss,
            record.val_acc * 100.0,
        );
        logger.log(&record)?;
        history.push(record);
    }

    let elapsed = started.elapsed().as_secs_f64();
    println!(
        "Average time per epoch: {:.2}s",
        elapsed / cfg.epochs.max(1) as f64
    );
    println!("Total training time: {:.2}m", elapsed / 60.0);
    tracing::info!("Training complete after {} epochs", cfg.epochs);

    Ok((model, history))
}

/// Time-based learning-rate decay: lr_t = lr0 / (1 + decay * t).
struct DecaySchedule {
    initial: f64,
    decay: f64,
}

impl DecaySchedule {
    fn new(initial: f64, decay: f64) -> Self {
        Self { initial, decay }
    }

    fn learning_rate(&self, step: usize) -> f64 {
        self.initial / (1.0 + self.decay * step as f64)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::dataset::{CifarSample, IMAGE_PIXELS};
    use crate::domain::labels;

    type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

    #[test]
    fn schedule_decays_from_the_initial_rate() {
        let schedule = DecaySchedule::new(0.01, 0.01 / 200.0);
        assert_eq!(schedule.learning_rate(0), 0.01);

        let later = schedule.learning_rate(1000);
        assert!(later < 0.01);
        assert!((later - 0.01 / 1.05).abs() < 1e-9);
    }

    #[test]
    fn one_epoch_produces_one_history_record() {
        let samples: Vec<CifarSample> = (0..4)
            .map(|i| CifarSample {
                image: (0..IMAGE_PIXELS)
                    .map(|p| ((i * 97 + p) % 256) as f32 / 255.0)
                    .collect(),
                label: labels::one_hot(i % 10, 10),
            })
            .collect();
        let train = CifarDataset::new(samples.clone());
        let val = CifarDataset::new(samples);

        let dir = std::env::temp_dir().join(format!("cifar-cnn-trainer-{}", std::process::id()));
        let logger = MetricsLogger::new(&dir, true).unwrap();

        let cfg = TrainConfig {
            epochs: 1,
            batch_size: 2,
            ..TrainConfig::default()
        };
        let model_config = CnnConfig::new(cfg.classes).with_block_dropout(cfg.dropout);

        let device = Default::default();
        let (_model, history) =
            run_training::<TestBackend>(&cfg, &model_config, train, val, &logger, device).unwrap();

        assert_eq!(history.len(), 1);
        let record = &history.records()[0];
        assert_eq!(record.epoch, 1);
        assert!(record.train_loss.is_finite());
        assert!((0.0..=1.0).contains(&record.val_acc));

        std::fs::remove_dir_all(dir).ok();
    }
}
