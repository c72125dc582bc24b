// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// LOAD mode: skip training entirely, reconstruct a model from the
// alternate persisted pair (model_load.json / model_load.bin),
// and report its loss and accuracy on the test set.
//
// The class count comes from the loaded topology, not from CLI
// flags — the persisted descriptor is the source of truth for
// what the model looks like.

use anyhow::Result;
use burn::backend::wgpu::WgpuDevice;

use crate::data::loader::CifarLoader;
use crate::infra::persistence::{ModelStore, PRETRAINED_MODEL};
use crate::ml::{evaluator, EvalBackend};

pub struct EvaluateUseCase {
    data_dir: String,
    artifact_dir: String,
    batch_size: usize,
}

impl EvaluateUseCase {
    pub fn new(data_dir: String, artifact_dir: String, batch_size: usize) -> Self {
        Self {
            data_dir,
            artifact_dir,
            batch_size,
        }
    }

    pub fn execute(&self) -> Result<()> {
        let device = WgpuDevice::default();

        let store = ModelStore::new(&self.artifact_dir);
        let (model, topology) = store.load::<EvalBackend>(PRETRAINED_MODEL, &device)?;
        tracing::info!(
            "Loaded pretrained model: {} conv layers, {} classes",
            topology.conv_count(),
            topology.classes
        );

        // Only the held-out split is needed here.
        let loader = CifarLoader::new(&self.data_dir, topology.classes);
        let test_dataset = loader.load_test()?;

        let result = evaluator::evaluate(&model, test_dataset, self.batch_size, &device);
        println!("******** Final test accuracy ********");
        println!("Test loss: {:.4}", result.loss);
        println!("Test accuracy: {:.2}%", result.accuracy * 100.0);

        Ok(())
    }
}
