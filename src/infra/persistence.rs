// ============================================================
// Layer 6 — Model Store
// ============================================================
// Persists a trained model as two independent artifacts:
//
//   1. {stem}.json — the topology descriptor: the ordered layer
//      list from the domain layer, pretty-printed JSON. Readable
//      and verifiable without the framework.
//   2. {stem}.bin  — the weight blob: all trainable tensors in
//      Burn's binary record format, full precision.
//
// The trained pair is always written under the stem "model"; LOAD
// mode reads the alternate stem "model_load" so a pretrained pair
// can sit next to freshly trained artifacts.
//
// Save order and atomicity: the weight blob lands first, the
// topology last, and each file is written to a temp path and
// renamed into place. The topology file is what load reads first,
// so a loadable pair only ever appears once both files are
// complete.
//
// Loading reverses the order: parse the topology, validate it
// against the fixed stack, rebuild the module, then apply the
// weight record — which fails if the blob does not structurally
// match the rebuilt module.
//
// Reference: Burn Book §5 (Records)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::{
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};

use crate::domain::topology::Topology;
use crate::ml::model::{Cnn, CnnConfig};

/// Stem of the artifact pair written after training.
pub const TRAINED_MODEL: &str = "model";
/// Stem of the alternate pair read by LOAD mode.
pub const PRETRAINED_MODEL: &str = "model_load";

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Write the trained artifact pair, replacing any previous one.
    pub fn save<B: Backend>(&self, model: &Cnn<B>, topology: &Topology) -> Result<()> {
        let weights = BinBytesRecorder::<FullPrecisionSettings>::default()
            .record(model.clone().into_record(), ())
            .context("Failed to encode model weights")?;
        write_atomic(&self.weights_path(TRAINED_MODEL), &weights)?;

        let descriptor = serde_json::to_string_pretty(topology)?;
        write_atomic(&self.topology_path(TRAINED_MODEL), descriptor.as_bytes())?;

        tracing::info!("Saved model artifacts to '{}'", self.dir.display());
        Ok(())
    }

    /// Load an artifact pair by stem: topology first, then weights.
    pub fn load<B: Backend>(&self, stem: &str, device: &B::Device) -> Result<(Cnn<B>, Topology)> {
        let topology_path = self.topology_path(stem);
        let descriptor = fs::read_to_string(&topology_path).with_context(|| {
            format!(
                "Cannot read topology file '{}'. Train a model first.",
                topology_path.display()
            )
        })?;
        let topology: Topology = serde_json::from_str(&descriptor).with_context(|| {
            format!(
                "Topology file '{}' is not a valid layer description",
                topology_path.display()
            )
        })?;

        let config = CnnConfig::from_topology(&topology)?;
        let model: Cnn<B> = config.init(device);

        let weights_path = self.weights_path(stem);
        let bytes = fs::read(&weights_path).with_context(|| {
            format!("Cannot read weights file '{}'", weights_path.display())
        })?;
        let record = BinBytesRecorder::<FullPrecisionSettings>::default()
            .load(bytes, device)
            .with_context(|| {
                format!(
                    "Weights in '{}' do not match the persisted topology",
                    weights_path.display()
                )
            })?;

        tracing::info!("Loaded model '{}' from '{}'", stem, self.dir.display());
        Ok((model.load_record(record), topology))
    }

    fn topology_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.json"))
    }

    fn weights_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}.bin"))
    }
}

/// Write bytes to a temp file next to `path` and rename it into place.
/// The rename is what makes the artifact visible, so readers never
/// observe a half-written file at the final path.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)
        .with_context(|| format!("Cannot write temp file '{}'", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Cannot move '{}' into place", tmp.display()))?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    fn temp_store(tag: &str) -> (ModelStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("cifar-cnn-{tag}-{}", std::process::id()));
        fs::remove_dir_all(&dir).ok();
        (ModelStore::new(&dir), dir)
    }

    #[test]
    fn round_trip_reproduces_inference_outputs() {
        let device = Default::default();
        let config = CnnConfig::new(10);
        let model: Cnn<TestBackend> = config.init(&device);

        let (store, dir) = temp_store("roundtrip");
        store.save(&model, &config.topology()).unwrap();

        let (reloaded, topology) = store.load::<TestBackend>(TRAINED_MODEL, &device).unwrap();
        assert_eq!(topology, config.topology());

        let input = Tensor::<TestBackend, 4>::random([2, 3, 32, 32], Distribution::Default, &device);
        let original = model.forward(input.clone()).into_data();
        let restored = reloaded.forward(input).into_data();
        original.assert_approx_eq(&restored, 5);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_artifacts_fail_loudly() {
        let device = Default::default();
        let (store, dir) = temp_store("missing");

        let err = store
            .load::<TestBackend>(PRETRAINED_MODEL, &device)
            .unwrap_err();
        assert!(format!("{err:#}").contains("model_load.json"));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_weights_fail_even_with_valid_topology() {
        let device = Default::default();
        let (store, dir) = temp_store("no-weights");

        // A topology file without its weight blob is not loadable.
        let topology = CnnConfig::new(10).topology();
        let json = serde_json::to_string_pretty(&topology).unwrap();
        fs::write(dir.join("model_load.json"), json).unwrap();

        let err = store
            .load::<TestBackend>(PRETRAINED_MODEL, &device)
            .unwrap_err();
        assert!(format!("{err:#}").contains("model_load.bin"));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn foreign_topology_is_rejected_before_weights() {
        let device = Default::default();
        let (store, dir) = temp_store("foreign");

        fs::write(
            dir.join("model_load.json"),
            r#"{ "classes": 10, "layers": [ { "layer": "global_avg_pool" } ] }"#,
        )
        .unwrap();

        assert!(store.load::<TestBackend>(PRETRAINED_MODEL, &device).is_err());

        fs::remove_dir_all(dir).ok();
    }
}
