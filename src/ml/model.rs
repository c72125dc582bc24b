use anyhow::{bail, Context, Result};
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::topology::{LayerSpec, Topology, STAGE1_FILTERS, STAGE2_FILTERS};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct CnnConfig {
    pub classes: usize,

    /// Dropout rate right after the first convolution.
    #[config(default = 0.2)]
    pub entry_dropout: f64,

    /// Dropout rate after each pooled convolution block.
    #[config(default = 0.5)]
    pub block_dropout: f64,
}

impl CnnConfig {
    /// The declarative layer list this config describes. This is the
    /// form that gets persisted and inspected; `init` builds the
    /// executable module with the same structure.
    pub fn topology(&self) -> Topology {
        Topology::conv_classifier(self.classes, self.entry_dropout, self.block_dropout)
    }

    /// Reconstruct the config from a persisted layer list.
    ///
    /// Fails with a structural-mismatch error for any descriptor list
    /// that is not exactly the fixed convolutional stack — the weight
    /// blob paired with such a file could not fit the module anyway.
    pub fn from_topology(topology: &Topology) -> Result<Self> {
        if topology.classes == 0 {
            bail!("topology declares zero output classes");
        }

        let mut dropout_rates = topology.layers.iter().filter_map(|layer| match layer {
            LayerSpec::Dropout { rate } => Some(*rate),
            _ => None,
        });
        let entry_dropout = dropout_rates
            .next()
            .context("topology has no dropout layers")?;
        let block_dropout = dropout_rates
            .next()
            .context("topology is missing the block dropout layer")?;

        let config = CnnConfig::new(topology.classes)
            .with_entry_dropout(entry_dropout)
            .with_block_dropout(block_dropout);
        if config.topology() != *topology {
            bail!(
                "topology descriptor ({} layers) does not match the fixed \
                 convolutional stack",
                topology.layers.len()
            );
        }
        Ok(config)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Cnn<B> {
        let conv = |channels: [usize; 2], kernel: [usize; 2], padding: PaddingConfig2d| {
            Conv2dConfig::new(channels, kernel)
                .with_padding(padding)
                .init(device)
        };
        let pool = || MaxPool2dConfig::new([3, 3]).with_strides([2, 2]).init();

        Cnn {
            // 32x32x3 → 32x32x96, pooled to 15x15
            conv1: conv([3, STAGE1_FILTERS], [3, 3], PaddingConfig2d::Same),
            conv2: conv([STAGE1_FILTERS, STAGE1_FILTERS], [3, 3], PaddingConfig2d::Same),
            conv3: conv([STAGE1_FILTERS, STAGE1_FILTERS], [3, 3], PaddingConfig2d::Same),
            pool1: pool(),

            // 15x15x96 → 13x13x192 (one valid conv), pooled to 6x6
            conv4: conv([STAGE1_FILTERS, STAGE2_FILTERS], [3, 3], PaddingConfig2d::Same),
            conv5: conv([STAGE2_FILTERS, STAGE2_FILTERS], [3, 3], PaddingConfig2d::Valid),
            conv6: conv([STAGE2_FILTERS, STAGE2_FILTERS], [3, 3], PaddingConfig2d::Same),
            pool2: pool(),

            // 6x6x192 → 1x1 projections down to the class count
            conv7: conv([STAGE2_FILTERS, STAGE2_FILTERS], [3, 3], PaddingConfig2d::Same),
            conv8: conv([STAGE2_FILTERS, STAGE2_FILTERS], [1, 1], PaddingConfig2d::Valid),
            conv9: conv([STAGE2_FILTERS, self.classes], [1, 1], PaddingConfig2d::Valid),

            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            entry_dropout: DropoutConfig::new(self.entry_dropout).init(),
            block_dropout: DropoutConfig::new(self.block_dropout).init(),
        }
    }
}

/// The convolutional classifier.
///
/// B is the Burn backend — generic so the same module trains on the
/// autodiff backend and evaluates on its inner backend.
#[derive(Module, Debug)]
pub struct Cnn<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    conv4: Conv2d<B>,
    conv5: Conv2d<B>,
    conv6: Conv2d<B>,
    conv7: Conv2d<B>,
    conv8: Conv2d<B>,
    conv9: Conv2d<B>,
    pool1: MaxPool2d,
    pool2: MaxPool2d,
    global_pool: AdaptiveAvgPool2d,
    entry_dropout: Dropout,
    block_dropout: Dropout,
}

impl<B: Backend> Cnn<B> {
    /// images: [batch, 3, 32, 32] → class logits: [batch, classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(images));
        let x = self.entry_dropout.forward(x);
        let x = relu(self.conv2.forward(x));
        let x = relu(self.conv3.forward(x));
        let x = self.block_dropout.forward(self.pool1.forward(x));

        let x = relu(self.conv4.forward(x));
        let x = relu(self.conv5.forward(x));
        let x = relu(self.conv6.forward(x));
        let x = self.block_dropout.forward(self.pool2.forward(x));

        let x = relu(self.conv7.forward(x));
        let x = relu(self.conv8.forward(x));
        let x = self.conv9.forward(x);

        // Global average pooling collapses the spatial grid, leaving
        // one logit per class; softmax is folded into the loss.
        self.global_pool.forward(x).flatten(1, 3)
    }

    /// Forward pass plus cross-entropy loss against integer targets.
    pub fn forward_loss(
        &self,
        images: Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn forward_produces_one_logit_per_class() {
        let device = Default::default();
        let model: Cnn<TestBackend> = CnnConfig::new(10).init(&device);
        let images = Tensor::random([2, 3, 32, 32], Distribution::Default, &device);
        assert_eq!(model.forward(images).dims(), [2, 10]);
    }

    #[test]
    fn config_round_trips_through_topology() {
        let config = CnnConfig::new(10).with_block_dropout(0.4);
        let rebuilt = CnnConfig::from_topology(&config.topology()).unwrap();
        assert_eq!(rebuilt.classes, 10);
        assert_eq!(rebuilt.entry_dropout, 0.2);
        assert_eq!(rebuilt.block_dropout, 0.4);
    }

    #[test]
    fn truncated_topology_is_rejected() {
        let mut topology = CnnConfig::new(10).topology();
        topology.layers.pop();
        assert!(CnnConfig::from_topology(&topology).is_err());
    }

    #[test]
    fn reordered_topology_is_rejected() {
        let mut topology = CnnConfig::new(10).topology();
        topology.layers.swap(0, 1);
        assert!(CnnConfig::from_topology(&topology).is_err());
    }
}
