// ============================================================
// Layer 3 — Topology Descriptors
// ============================================================
// The network exists in two representations: this declarative,
// ordered list of tagged layer descriptors, and the Burn module
// that executes it (ml::model). The descriptor list is what gets
// written to the topology file, so a persisted model can be
// inspected and validated without touching the framework.

use serde::{Deserialize, Serialize};

/// Filter width of the first convolution stage.
pub const STAGE1_FILTERS: usize = 96;
/// Filter width of the second and third convolution stages.
pub const STAGE2_FILTERS: usize = 192;

/// Spatial padding mode of a convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Output keeps the input's spatial size.
    Same,
    /// No padding; output shrinks by kernel - 1.
    Valid,
}

/// Pointwise activation applied between layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Softmax,
}

/// One layer of the stack, tagged by kind.
///
/// Serialized with an explicit `layer` tag so the topology file
/// reads as a flat list of named layers:
///
/// ```json
/// { "layer": "conv", "filters": 96, "kernel": [3, 3], "padding": "same" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum LayerSpec {
    Conv {
        filters: usize,
        kernel: [usize; 2],
        padding: Padding,
    },
    Activation {
        kind: Activation,
    },
    MaxPool {
        window: [usize; 2],
        stride: [usize; 2],
    },
    Dropout {
        rate: f64,
    },
    GlobalAvgPool,
}

/// The full network description: class count plus the ordered layer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub classes: usize,
    pub layers: Vec<LayerSpec>,
}

impl Topology {
    /// The fixed convolutional classifier stack.
    ///
    /// Three convolution blocks with widening filters (96, 192, 192),
    /// each closed by a 3x3 stride-2 max-pool and dropout, then a 1x1
    /// projection down to the class count, global average pooling, and
    /// softmax. Built once at startup; everything downstream (model
    /// construction, persistence, load-time validation) consumes this
    /// list rather than re-stating the stack.
    pub fn conv_classifier(classes: usize, entry_dropout: f64, block_dropout: f64) -> Self {
        let conv = |filters, kernel, padding| LayerSpec::Conv {
            filters,
            kernel,
            padding,
        };
        let relu = LayerSpec::Activation {
            kind: Activation::Relu,
        };
        let pool = LayerSpec::MaxPool {
            window: [3, 3],
            stride: [2, 2],
        };

        let layers = vec![
            conv(STAGE1_FILTERS, [3, 3], Padding::Same),
            relu.clone(),
            LayerSpec::Dropout {
                rate: entry_dropout,
            },
            conv(STAGE1_FILTERS, [3, 3], Padding::Same),
            relu.clone(),
            conv(STAGE1_FILTERS, [3, 3], Padding::Same),
            relu.clone(),
            pool.clone(),
            LayerSpec::Dropout {
                rate: block_dropout,
            },
            conv(STAGE2_FILTERS, [3, 3], Padding::Same),
            relu.clone(),
            conv(STAGE2_FILTERS, [3, 3], Padding::Valid),
            relu.clone(),
            conv(STAGE2_FILTERS, [3, 3], Padding::Same),
            relu.clone(),
            pool,
            LayerSpec::Dropout {
                rate: block_dropout,
            },
            conv(STAGE2_FILTERS, [3, 3], Padding::Same),
            relu.clone(),
            conv(STAGE2_FILTERS, [1, 1], Padding::Valid),
            relu,
            conv(classes, [1, 1], Padding::Valid),
            LayerSpec::GlobalAvgPool,
            LayerSpec::Activation {
                kind: Activation::Softmax,
            },
        ];

        Self { classes, layers }
    }

    /// Number of convolution layers in the stack.
    pub fn conv_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l, LayerSpec::Conv { .. }))
            .count()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_stack_shape() {
        let t = Topology::conv_classifier(10, 0.2, 0.5);
        assert_eq!(t.classes, 10);
        assert_eq!(t.conv_count(), 9);

        // Opens with a 96-filter same-padded convolution.
        assert_eq!(
            t.layers[0],
            LayerSpec::Conv {
                filters: STAGE1_FILTERS,
                kernel: [3, 3],
                padding: Padding::Same,
            }
        );

        // Closes with global pooling and softmax.
        let n = t.layers.len();
        assert_eq!(t.layers[n - 2], LayerSpec::GlobalAvgPool);
        assert_eq!(
            t.layers[n - 1],
            LayerSpec::Activation {
                kind: Activation::Softmax,
            }
        );

        // Two stride-2 pools.
        let pools = t
            .layers
            .iter()
            .filter(|l| matches!(l, LayerSpec::MaxPool { .. }))
            .count();
        assert_eq!(pools, 2);
    }

    #[test]
    fn final_conv_projects_to_class_count() {
        let t = Topology::conv_classifier(10, 0.2, 0.5);
        let last_conv = t
            .layers
            .iter()
            .rev()
            .find_map(|l| match l {
                LayerSpec::Conv { filters, .. } => Some(*filters),
                _ => None,
            })
            .unwrap();
        assert_eq!(last_conv, 10);
    }

    #[test]
    fn json_round_trip() {
        let t = Topology::conv_classifier(10, 0.2, 0.5);
        let json = serde_json::to_string_pretty(&t).unwrap();
        let back: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
