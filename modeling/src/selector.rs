use serde::{Deserialize, Serialize};

use crate::{
    artifact::SelectedModel,
    error::TrainingError,
    frame::TrainingFrame,
    metrics::{mean_squared_error, r_squared},
    models::{FittedModel, ModelKind},
    split::holdout_split,
};

/// Seed used by production training runs.
pub const DEFAULT_SEED: u64 = 72;

/// Held-out fraction used by production training runs.
pub const DEFAULT_HOLDOUT_FRACTION: f64 = 0.4;

/// Knobs for one training run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Seed for the split and any model-internal randomness.
    pub seed: u64,
    /// Fraction of rows held out for evaluation.
    pub holdout_fraction: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            holdout_fraction: DEFAULT_HOLDOUT_FRACTION,
        }
    }
}

/// Holdout scores for one candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Evaluation {
    /// Candidate family.
    pub model: ModelKind,
    /// Mean squared error on the holdout (lower is better).
    pub mse: f64,
    /// Coefficient of determination on the holdout (higher is better).
    pub r2: f64,
}

/// Everything a training run produces.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The winning fitted candidate plus metadata, ready to persist.
    pub artifact: SelectedModel,
    /// Holdout scores for every candidate, in roster order.
    pub evaluations: Vec<Evaluation>,
}

/// Trains the fixed candidate roster and selects the best performer.
///
/// The frame is partitioned once with the seeded split; every candidate
/// fits on the training partition and is scored on the holdout. The
/// winner is the candidate with the lowest mean squared error, ties
/// broken by the highest R²; on a full tie the earlier roster entry
/// stands. Selection itself involves no randomness.
pub fn train(
    frame: &TrainingFrame,
    options: TrainingOptions,
) -> Result<TrainingOutcome, TrainingError> {
    let (rows, targets) = frame.matrix();
    let (train_indices, holdout_indices) =
        holdout_split(rows.len(), options.holdout_fraction, options.seed)?;

    let gather_rows = |indices: &[usize]| -> Vec<Vec<f64>> {
        indices.iter().map(|&index| rows[index].clone()).collect()
    };
    let gather_targets =
        |indices: &[usize]| -> Vec<f64> { indices.iter().map(|&index| targets[index]).collect() };

    let train_rows = gather_rows(&train_indices);
    let train_targets = gather_targets(&train_indices);
    let holdout_rows = gather_rows(&holdout_indices);
    let holdout_targets = gather_targets(&holdout_indices);

    let mut fitted = Vec::with_capacity(ModelKind::ROSTER.len());
    let mut evaluations = Vec::with_capacity(ModelKind::ROSTER.len());
    for kind in ModelKind::ROSTER {
        let model = FittedModel::fit(kind, &train_rows, &train_targets, options.seed);
        let predictions: Vec<f64> = holdout_rows.iter().map(|row| model.predict(row)).collect();
        evaluations.push(Evaluation {
            model: kind,
            mse: mean_squared_error(&predictions, &holdout_targets),
            r2: r_squared(&predictions, &holdout_targets),
        });
        fitted.push(model);
    }

    let mut best = 0;
    for index in 1..evaluations.len() {
        if ranks_better(&evaluations[index], &evaluations[best]) {
            best = index;
        }
    }

    let winner = fitted.swap_remove(best);
    let artifact = SelectedModel::assemble(
        winner,
        &options,
        &evaluations,
        train_indices.len(),
        holdout_indices.len(),
        frame.dropped_rows,
    );
    Ok(TrainingOutcome {
        artifact,
        evaluations,
    })
}

/// Composite ordering: mse ascending, then r2 descending. Strict, so
/// the earlier candidate keeps a full tie.
fn ranks_better(candidate: &Evaluation, incumbent: &Evaluation) -> bool {
    match candidate.mse.total_cmp(&incumbent.mse) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => candidate.r2.total_cmp(&incumbent.r2).is_gt(),
    }
}
