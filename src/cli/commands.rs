// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `load`, and all their
// configurable flags.
//
// clap's derive macros generate help text, unknown-value errors,
// and type conversion (string → usize, f64, enum).

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::{OptimizerKind, TrainConfig};
use crate::data::loader::NUM_CLASSES;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier on CIFAR-10, persist it, and report test accuracy
    Train(TrainArgs),

    /// Load a previously persisted model and report test accuracy
    Load(LoadArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing the extracted CIFAR-10 binary batches
    #[arg(long, default_value = "data/cifar-10-batches-bin")]
    pub data_dir: String,

    /// Directory for model artifacts, the metrics log, and charts
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Number of samples processed together in one gradient step
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    /// Initial learning rate of the optimizer
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// Per-step learning-rate decay; defaults to lr / epochs
    #[arg(long)]
    pub decay: Option<f64>,

    /// Momentum coefficient (Nesterov acceleration is always on for SGD)
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    /// Dropout rate of the pooled convolution blocks
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Weight-update rule
    #[arg(long, value_enum, default_value = "sgd")]
    pub optimizer: OptimizerArg,

    /// Seed for shuffling and weight initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Truncate training.csv instead of appending to it
    #[arg(long)]
    pub fresh_log: bool,
}

/// CLI-facing optimizer choice; mapped onto the application enum so
/// the application layer never sees clap types.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OptimizerArg {
    Sgd,
    RmsProp,
}

impl From<OptimizerArg> for OptimizerKind {
    fn from(arg: OptimizerArg) -> Self {
        match arg {
            OptimizerArg::Sgd => OptimizerKind::Sgd,
            OptimizerArg::RmsProp => OptimizerKind::RmsProp,
        }
    }
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        let lr_decay = a.decay.unwrap_or(a.lr / a.epochs.max(1) as f64);
        TrainConfig {
            data_dir: a.data_dir,
            artifact_dir: a.artifact_dir,
            classes: NUM_CLASSES,
            batch_size: a.batch_size,
            epochs: a.epochs,
            learning_rate: a.lr,
            lr_decay,
            momentum: a.momentum,
            dropout: a.dropout,
            optimizer: a.optimizer.into(),
            seed: a.seed,
            fresh_log: a.fresh_log,
        }
    }
}

/// All arguments for the `load` command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Directory containing the extracted CIFAR-10 binary batches
    #[arg(long, default_value = "data/cifar-10-batches-bin")]
    pub data_dir: String,

    /// Directory holding the model_load.json / model_load.bin pair
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Batch size for the evaluation pass
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_defaults_to_lr_over_epochs() {
        let args = TrainArgs {
            data_dir: String::new(),
            artifact_dir: String::new(),
            batch_size: 64,
            epochs: 200,
            lr: 0.01,
            decay: None,
            momentum: 0.9,
            dropout: 0.5,
            optimizer: OptimizerArg::Sgd,
            seed: 42,
            fresh_log: false,
        };
        let cfg = TrainConfig::from(args);
        assert!((cfg.lr_decay - 0.01 / 200.0).abs() < 1e-12);
        assert_eq!(cfg.classes, NUM_CLASSES);
    }

    #[test]
    fn explicit_decay_wins_over_the_default() {
        let args = TrainArgs {
            data_dir: String::new(),
            artifact_dir: String::new(),
            batch_size: 64,
            epochs: 200,
            lr: 0.01,
            decay: Some(1e-3),
            momentum: 0.9,
            dropout: 0.5,
            optimizer: OptimizerArg::RmsProp,
            seed: 42,
            fresh_log: false,
        };
        let cfg = TrainConfig::from(args);
        assert_eq!(cfg.lr_decay, 1e-3);
        assert_eq!(cfg.optimizer, OptimizerKind::RmsProp);
    }
}
