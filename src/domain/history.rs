// ============================================================
// Layer 3 — Training History
// ============================================================
// One record per epoch, appended by the training loop and
// consumed once by reporting (CSV log and charts).

use serde::{Deserialize, Serialize};

/// Scalar metrics for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    pub train_loss: f64,

    /// Fraction of training samples classified correctly, in [0, 1]
    pub train_acc: f64,

    /// Average cross-entropy loss over the validation set
    pub val_loss: f64,

    /// Fraction of validation samples classified correctly, in [0, 1]
    pub val_acc: f64,
}

/// Ordered per-epoch records for one training run.
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    records: Vec<EpochRecord>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_accumulate_in_order() {
        let mut history = TrainingHistory::new();
        assert!(history.is_empty());

        for epoch in 1..=3 {
            history.push(EpochRecord {
                epoch,
                train_loss: 2.0,
                train_acc: 0.3,
                val_loss: 2.1,
                val_acc: 0.25,
            });
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.records()[0].epoch, 1);
        assert_eq!(history.records()[2].epoch, 3);
    }
}
