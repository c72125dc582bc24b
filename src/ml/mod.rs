// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn-specific code. No other layer
// imports from burn directly except the data pipeline's Dataset
// and Batcher implementations.
//
//   model.rs     — the convolutional classifier; built from the
//                  domain topology descriptors and validated
//                  against them on load
//   trainer.rs   — the epoch loop: augmented batches, SGD with
//                  Nesterov momentum and a per-step decayed
//                  learning rate, validation pass, history
//   evaluator.rs — batched forward-only loss/accuracy pass
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Convolutional classifier architecture
pub mod model;

/// Full training loop with validation and metric logging
pub mod trainer;

/// Forward-only evaluation over a dataset
pub mod evaluator;

/// Backend used for gradient training in the application binary.
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Backend used for inference and evaluation (no autodiff tape).
pub type EvalBackend = burn::backend::Wgpu;
