// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one of the two
// goals: training a classifier from scratch, or evaluating a
// previously persisted one.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination

// The training workflow: load → train → chart → persist → reload → evaluate
pub mod train_use_case;

// The load-and-evaluate workflow
pub mod evaluate_use_case;
