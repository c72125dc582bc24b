// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to any one business
// layer:
//
//   persistence.rs — model saving and loading. The topology goes
//                    to a human-readable JSON file, the learned
//                    weights to a binary record; both are written
//                    through a temp file + rename so a crash never
//                    leaves a partially-written artifact behind.
//
//   metrics.rs     — per-epoch CSV log. Appends across runs so a
//                    long experiment's record survives restarts.
//
//   charts.rs      — accuracy and loss curves rendered to PNG.

/// Topology + weights persistence
pub mod persistence;

/// Training metrics CSV logger
pub mod metrics;

/// Learning-curve chart rendering
pub mod charts;
