// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, built on clap's derive
// macros. The mode is a required subcommand: anything other than
// `train` or `load` is rejected by the parser with an error and
// usage text, rather than silently falling through.
//
// All business logic is delegated to Layer 2 (application).

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, LoadArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "cifar-cnn",
    version = "0.1.0",
    about = "Train a convolutional CIFAR-10 classifier, or evaluate a persisted one."
)]
pub struct Cli {
    /// The subcommand to run (train or load)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => Self::run_train(args),
            Commands::Load(args) => Self::run_load(args),
        }
    }

    /// Handles the `train` subcommand.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting a training run from '{}'", args.data_dir);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training run complete. Model artifacts saved.");
        Ok(())
    }

    /// Handles the `load` subcommand.
    fn run_load(args: LoadArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let use_case = EvaluateUseCase::new(args.data_dir, args.artifact_dir, args.batch_size);
        use_case.execute()
    }
}
