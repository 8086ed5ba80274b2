//! The fixed candidate roster and their fitted forms.

mod boosting;
mod forest;
mod linear;
mod tree;

pub use boosting::BoostedModel;
pub use forest::ForestModel;
pub use linear::LinearModel;
pub use tree::{RegressionTree, TreeParams};

use serde::{Deserialize, Serialize};

/// Ensemble size shared by the two tree-based candidates.
pub const ENSEMBLE_SIZE: usize = 160;

/// Shrinkage used by the boosted candidate.
pub const BOOSTING_LEARNING_RATE: f64 = 0.1;

/// Tree depth used by the boosted candidate.
pub const BOOSTING_MAX_DEPTH: usize = 3;

/// The three candidate families evaluated on every training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Bootstrap ensemble of full-depth regression trees.
    RandomForest,
    /// Ordinary-least-squares linear regression.
    LinearRegression,
    /// Gradient-boosted ensemble of shallow trees.
    GradientBoosting,
}

impl ModelKind {
    /// Evaluation order; also the tie-break order when scores are
    /// fully equal (earlier wins).
    pub const ROSTER: [Self; 3] = [
        Self::RandomForest,
        Self::LinearRegression,
        Self::GradientBoosting,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RandomForest => "Random Forest",
            Self::LinearRegression => "Linear Regression",
            Self::GradientBoosting => "Gradient Boosting",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.label())
    }
}

/// A fitted candidate, dispatched by family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FittedModel {
    /// Fitted random forest.
    Forest(ForestModel),
    /// Fitted linear regression.
    Linear(LinearModel),
    /// Fitted gradient boosting.
    Boosted(BoostedModel),
}

impl FittedModel {
    /// Fits one candidate family with its fixed hyperparameters.
    #[must_use]
    pub fn fit(kind: ModelKind, rows: &[Vec<f64>], targets: &[f64], seed: u64) -> Self {
        match kind {
            ModelKind::RandomForest => {
                Self::Forest(ForestModel::fit(rows, targets, ENSEMBLE_SIZE, seed))
            }
            ModelKind::LinearRegression => Self::Linear(LinearModel::fit(rows, targets)),
            ModelKind::GradientBoosting => Self::Boosted(BoostedModel::fit(
                rows,
                targets,
                ENSEMBLE_SIZE,
                BOOSTING_LEARNING_RATE,
                BOOSTING_MAX_DEPTH,
            )),
        }
    }

    /// Family of the fitted model.
    #[must_use]
    pub const fn kind(&self) -> ModelKind {
        match self {
            Self::Forest(_) => ModelKind::RandomForest,
            Self::Linear(_) => ModelKind::LinearRegression,
            Self::Boosted(_) => ModelKind::GradientBoosting,
        }
    }

    /// Predicts the target for one feature row.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Self::Forest(model) => model.predict(row),
            Self::Linear(model) => model.predict(row),
            Self::Boosted(model) => model.predict(row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_order_matches_evaluation_order() {
        assert_eq!(
            ModelKind::ROSTER,
            [
                ModelKind::RandomForest,
                ModelKind::LinearRegression,
                ModelKind::GradientBoosting
            ]
        );
    }

    #[test]
    fn fit_dispatches_by_kind() {
        let rows: Vec<Vec<f64>> = (0..12).map(|i| vec![f64::from(i)]).collect();
        let targets: Vec<f64> = rows.iter().map(|row| row[0] * 2.0).collect();
        for kind in ModelKind::ROSTER {
            let fitted = FittedModel::fit(kind, &rows, &targets, 72);
            assert_eq!(fitted.kind(), kind);
            assert!(fitted.predict(&rows[3]).is_finite());
        }
    }
}
