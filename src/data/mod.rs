// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw dataset bytes on disk to GPU-ready tensor
// batches:
//
//   CIFAR-10 binary batches
//       │
//       ▼
//   CifarLoader       → parses records, normalizes pixels,
//       │               one-hot encodes labels
//       ▼
//   CifarDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   Augmenter         → random rotation / flip / shift per sample
//       │
//       ▼
//   ImageBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads and normalizes the CIFAR-10 binary batch files
pub mod loader;

/// Sample type and Burn Dataset implementation
pub mod dataset;

/// Randomized label-preserving image transforms
pub mod augment;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
