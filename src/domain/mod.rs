// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and functions
//
// This keeps the network description, the label encoding, and
// the training history unit-testable without a GPU, and lets the
// persisted topology file be read and validated independently of
// the framework object that executes it.

// Ordered, serializable description of the network's layer stack
pub mod topology;

// One-hot label encoding and decoding
pub mod labels;

// Per-epoch metric records accumulated during training
pub mod history;
