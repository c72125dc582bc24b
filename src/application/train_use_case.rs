// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the CIFAR-10 dataset     (Layer 4 - data)
//   Step 2: Open the metrics log          (Layer 6 - infra)
//   Step 3: Run the training loop         (Layer 5 - ml)
//   Step 4: Render learning curves        (Layer 6 - infra)
//   Step 5: Persist the model, reload it  (Layer 6 - infra)
//   Step 6: Evaluate the reloaded model   (Layer 5 - ml)
//
// Evaluation runs on the reloaded copy of the model, so a broken
// save surfaces in this run rather than the next one.

use std::fmt;
use std::path::Path;

use anyhow::Result;
use burn::backend::wgpu::WgpuDevice;
use serde::{Deserialize, Serialize};

use crate::data::loader::{CifarLoader, NUM_CLASSES};
use crate::infra::{
    charts,
    metrics::MetricsLogger,
    persistence::{ModelStore, TRAINED_MODEL},
};
use crate::ml::{evaluator, model::CnnConfig, trainer, EvalBackend, TrainBackend};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run, fixed at process start.
// Serialisable so a run's settings can be dumped alongside its logs.

/// Gradient-descent flavour used to update the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Sgd,
    RmsProp,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Sgd => write!(f, "SGD"),
            OptimizerKind::RmsProp => write!(f, "RMSProp"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir: String,
    pub artifact_dir: String,
    pub classes: usize,
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,

    /// Per-step learning-rate decay; defaults to learning_rate / epochs.
    pub lr_decay: f64,

    pub momentum: f64,

    /// Dropout rate of the pooled convolution blocks. The entry
    /// dropout after the first convolution is part of the fixed
    /// topology and stays at 0.2.
    pub dropout: f64,

    pub optimizer: OptimizerKind,
    pub seed: u64,

    /// Truncate the metrics CSV instead of appending to it.
    pub fresh_log: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let learning_rate = 0.01;
        let epochs = 200;
        Self {
            data_dir: "data/cifar-10-batches-bin".to_string(),
            artifact_dir: "artifacts".to_string(),
            classes: NUM_CLASSES,
            batch_size: 64,
            epochs,
            learning_rate,
            lr_decay: learning_rate / epochs as f64,
            momentum: 0.9,
            dropout: 0.5,
            optimizer: OptimizerKind::Sgd,
            seed: 42,
            fresh_log: false,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        print_run_details(cfg);

        // ── Step 1: Load the dataset ──────────────────────────────────────────
        // The original test split doubles as validation data, so the
        // curves track generalisation on truly held-out images.
        tracing::info!("Loading CIFAR-10 from '{}'", cfg.data_dir);
        let loader = CifarLoader::new(&cfg.data_dir, cfg.classes);
        let (train_dataset, test_dataset) = loader.load()?;
        tracing::info!(
            "Dataset ready: {} training / {} test images",
            train_dataset.sample_count(),
            test_dataset.sample_count()
        );

        // ── Step 2: Open the metrics log ──────────────────────────────────────
        let logger = MetricsLogger::new(&cfg.artifact_dir, cfg.fresh_log)?;
        tracing::info!("Logging epoch metrics to '{}'", logger.csv_path().display());

        // ── Step 3: Train ─────────────────────────────────────────────────────
        let device = WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);

        let model_config = CnnConfig::new(cfg.classes).with_block_dropout(cfg.dropout);
        let (model, history) = trainer::run_training::<TrainBackend>(
            cfg,
            &model_config,
            train_dataset,
            test_dataset.clone(),
            &logger,
            device.clone(),
        )?;
        tracing::info!("Recorded {} epoch metrics", history.len());

        // ── Step 4: Learning curves ───────────────────────────────────────────
        let (accuracy_chart, loss_chart) =
            charts::render_curves(&history, cfg, Path::new(&cfg.artifact_dir))?;
        tracing::info!(
            "Wrote '{}' and '{}'",
            accuracy_chart.display(),
            loss_chart.display()
        );

        // ── Step 5: Persist, then reload what was persisted ───────────────────
        let store = ModelStore::new(&cfg.artifact_dir);
        store.save(&model, &model_config.topology())?;
        let (reloaded, _) = store.load::<EvalBackend>(TRAINED_MODEL, &device)?;
        tracing::info!("Round-trip reload of the persisted model succeeded");

        // ── Step 6: Final test-set evaluation ─────────────────────────────────
        let result = evaluator::evaluate(&reloaded, test_dataset, cfg.batch_size, &device);
        println!("******** Final test accuracy ********");
        println!("Test loss: {:.4}", result.loss);
        println!("Test accuracy: {:.2}%", result.accuracy * 100.0);

        Ok(())
    }
}

/// Hyperparameter summary printed before training starts.
fn print_run_details(cfg: &TrainConfig) {
    println!("******* Run configuration *******");
    println!("Epochs:        {}", cfg.epochs);
    println!("Batch size:    {}", cfg.batch_size);
    println!("Learning rate: {}", cfg.learning_rate);
    println!("LR decay:      {:.6}", cfg.lr_decay);
    println!("Momentum:      {}", cfg.momentum);
    println!("Dropout:       {}", cfg.dropout);
    println!("Optimizer:     {}", cfg.optimizer);
    println!();
}
