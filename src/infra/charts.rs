// ============================================================
// Layer 6 — Learning-Curve Charts
// ============================================================
// Renders the training history as two PNG line charts: accuracy
// over epochs and loss over epochs, each with the train series in
// red and the validation series in blue. The caption carries the
// run's hyperparameters so a chart is self-describing when it
// ends up detached from its log.

use anyhow::{anyhow, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::domain::history::TrainingHistory;

pub const ACCURACY_CHART: &str = "epoch-accuracy.png";
pub const LOSS_CHART: &str = "epoch-loss.png";

const CHART_SIZE: (u32, u32) = (1200, 800);

/// Render both charts under `dir` and return their paths.
pub fn render_curves(
    history: &TrainingHistory,
    cfg: &TrainConfig,
    dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    if history.is_empty() {
        tracing::warn!("Training history is empty; charts will have no data points");
    }
    let annotation = format!(
        "Dropout: {} | Learning rate: {} | Optimizer: {} | Decay: {:.6} | Batch size: {}",
        cfg.dropout, cfg.learning_rate, cfg.optimizer, cfg.lr_decay, cfg.batch_size,
    );

    let accuracy_path = dir.join(ACCURACY_CHART);
    render_chart(
        &accuracy_path,
        &format!("Epoch Accuracy — {annotation}"),
        "accuracy",
        0.0..1.0,
        series(history, |r| r.train_acc),
        series(history, |r| r.val_acc),
        SeriesLabelPosition::UpperLeft,
    )?;

    let loss_path = dir.join(LOSS_CHART);
    render_chart(
        &loss_path,
        &format!("Epoch Loss — {annotation}"),
        "loss",
        0.0..loss_axis_top(history),
        series(history, |r| r.train_loss),
        series(history, |r| r.val_loss),
        SeriesLabelPosition::UpperRight,
    )?;

    Ok((accuracy_path, loss_path))
}

fn series(
    history: &TrainingHistory,
    value: impl Fn(&crate::domain::history::EpochRecord) -> f64,
) -> Vec<(f64, f64)> {
    history
        .records()
        .iter()
        .map(|r| (r.epoch as f64, value(r)))
        .collect()
}

/// Upper bound for the loss axis: the largest finite loss plus a
/// small margin, or 1.0 for an empty/degenerate history.
fn loss_axis_top(history: &TrainingHistory) -> f64 {
    let top = history
        .records()
        .iter()
        .flat_map(|r| [r.train_loss, r.val_loss])
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    if top > 0.0 {
        top * 1.05
    } else {
        1.0
    }
}

#[allow(clippy::too_many_arguments)]
fn render_chart(
    path: &Path,
    caption: &str,
    y_desc: &str,
    y_range: std::ops::Range<f64>,
    train: Vec<(f64, f64)>,
    validation: Vec<(f64, f64)>,
    legend: SeriesLabelPosition,
) -> Result<()> {
    let epochs = train.len().max(2) as f64;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("chart backend: {e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .caption(caption, ("sans-serif", 22.0))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(1.0..epochs, y_range)
        .map_err(|e| anyhow!("chart build: {e}"))?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc(y_desc)
        .draw()
        .map_err(|e| anyhow!("chart mesh: {e}"))?;

    chart
        .draw_series(LineSeries::new(train, RED.stroke_width(2)))
        .map_err(|e| anyhow!("train series: {e}"))?
        .label("Train")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(validation, BLUE.stroke_width(2)))
        .map_err(|e| anyhow!("validation series: {e}"))?
        .label("Validation")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(legend)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| anyhow!("chart legend: {e}"))?;

    root.present().map_err(|e| anyhow!("chart present: {e}"))?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::EpochRecord;

    fn history(losses: &[(f64, f64)]) -> TrainingHistory {
        let mut h = TrainingHistory::new();
        for (i, &(train_loss, val_loss)) in losses.iter().enumerate() {
            h.push(EpochRecord {
                epoch: i + 1,
                train_loss,
                train_acc: 0.5,
                val_loss,
                val_acc: 0.5,
            });
        }
        h
    }

    #[test]
    fn loss_axis_covers_the_largest_loss() {
        let h = history(&[(2.3, 2.5), (1.9, 2.1)]);
        let top = loss_axis_top(&h);
        assert!(top >= 2.5);
        assert!(top < 3.0);
    }

    #[test]
    fn loss_axis_defaults_for_degenerate_histories() {
        assert_eq!(loss_axis_top(&TrainingHistory::new()), 1.0);
        assert_eq!(loss_axis_top(&history(&[(f64::NAN, f64::NAN)])), 1.0);
    }

    #[test]
    fn series_pairs_epochs_with_values() {
        let h = history(&[(2.0, 2.2), (1.5, 1.8)]);
        assert_eq!(series(&h, |r| r.train_loss), vec![(1.0, 2.0), (2.0, 1.5)]);
    }
}
