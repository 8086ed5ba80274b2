use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};

/// Bootstrap-aggregated ensemble of full-depth regression trees.
///
/// Each tree fits a bootstrap resample drawn from a seeded generator,
/// so the whole ensemble is reproducible for a given seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    trees: Vec<RegressionTree>,
}

impl ForestModel {
    /// Fits `estimators` trees on bootstrap resamples.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], estimators: usize, seed: u64) -> Self {
        if rows.is_empty() {
            return Self { trees: Vec::new() };
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = rows.len();
        let params = TreeParams::default();
        let trees = (0..estimators)
            .map(|_| {
                let bootstrap: Vec<usize> =
                    (0..samples).map(|_| rng.gen_range(0..samples)).collect();
                RegressionTree::fit(rows, targets, &bootstrap, params)
            })
            .collect();
        Self { trees }
    }

    /// Predicts by averaging over all trees.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>() / self.trees.len() as f64
    }

    /// Number of fitted trees.
    #[must_use]
    pub fn estimators(&self) -> usize {
        self.trees.len()
    }
}
