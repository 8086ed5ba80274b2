use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};

/// Gradient-boosted ensemble of shallow regression trees.
///
/// Stagewise least-squares boosting: starts from the target mean and
/// fits each depth-limited tree to the current residuals. The full
/// sample is used at every stage, so the fit is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedModel {
    baseline: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl BoostedModel {
    /// Fits `estimators` trees of depth `max_depth` with the given
    /// shrinkage.
    #[must_use]
    pub fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        estimators: usize,
        learning_rate: f64,
        max_depth: usize,
    ) -> Self {
        let baseline = if targets.is_empty() {
            0.0
        } else {
            targets.iter().sum::<f64>() / targets.len() as f64
        };
        let indices: Vec<usize> = (0..rows.len()).collect();
        let params = TreeParams::shallow(max_depth);

        let mut predictions = vec![baseline; targets.len()];
        let mut trees = Vec::with_capacity(estimators);
        for _ in 0..estimators {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(predictions.iter())
                .map(|(target, prediction)| target - prediction)
                .collect();
            let tree = RegressionTree::fit(rows, &residuals, &indices, params);
            for (prediction, row) in predictions.iter_mut().zip(rows.iter()) {
                *prediction += learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }
        Self {
            baseline,
            learning_rate,
            trees,
        }
    }

    /// Predicts the target for one feature row.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.baseline
            + self.learning_rate
                * self
                    .trees
                    .iter()
                    .map(|tree| tree.predict(row))
                    .sum::<f64>()
    }

    /// Number of boosting stages.
    #[must_use]
    pub fn estimators(&self) -> usize {
        self.trees.len()
    }
}
