use serde::{Deserialize, Serialize};

/// Ordinary-least-squares linear regression with intercept.
///
/// Solved in closed form via the normal equations; a tiny ridge term on
/// the diagonal keeps degenerate columns (e.g. an all-zero indicator)
/// solvable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<f64>,
    intercept: f64,
}

const RIDGE: f64 = 1e-8;

impl LinearModel {
    /// Fits the model on the given rows and targets.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>], targets: &[f64]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        // Augmented design: the extra trailing column is the intercept.
        let size = width + 1;
        let mut normal = vec![vec![0.0; size]; size];
        let mut moment = vec![0.0; size];
        for (row, target) in rows.iter().zip(targets.iter()) {
            for i in 0..size {
                let xi = if i < width { row[i] } else { 1.0 };
                moment[i] += xi * target;
                for j in 0..size {
                    let xj = if j < width { row[j] } else { 1.0 };
                    normal[i][j] += xi * xj;
                }
            }
        }
        for (i, diagonal) in normal.iter_mut().enumerate().take(width) {
            diagonal[i] += RIDGE;
        }
        let solution = solve(normal, moment);
        let intercept = solution.get(width).copied().unwrap_or(0.0);
        let mut weights = solution;
        weights.truncate(width);
        Self { weights, intercept }
    }

    /// Predicts the target for one feature row.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        row.iter()
            .zip(self.weights.iter())
            .map(|(value, weight)| value * weight)
            .sum::<f64>()
            + self.intercept
    }

    /// Fitted coefficients in column order.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Fitted intercept.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Vec<f64> {
    let size = rhs.len();
    for column in 0..size {
        let pivot = (column..size)
            .max_by(|&a, &b| matrix[a][column].abs().total_cmp(&matrix[b][column].abs()))
            .unwrap_or(column);
        matrix.swap(column, pivot);
        rhs.swap(column, pivot);
        let lead = matrix[column][column];
        if lead.abs() < 1e-12 {
            continue;
        }
        for row in column + 1..size {
            let factor = matrix[row][column] / lead;
            if factor == 0.0 {
                continue;
            }
            for k in column..size {
                matrix[row][k] -= factor * matrix[column][k];
            }
            rhs[row] -= factor * rhs[column];
        }
    }
    let mut solution = vec![0.0; size];
    for column in (0..size).rev() {
        let lead = matrix[column][column];
        if lead.abs() < 1e-12 {
            continue;
        }
        let trailing: f64 = (column + 1..size)
            .map(|k| matrix[column][k] * solution[k])
            .sum();
        solution[column] = (rhs[column] - trailing) / lead;
    }
    solution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_a_known_plane() {
        // y = 2*x0 - 3*x1 + 5
        let rows: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![f64::from(i), f64::from(i % 4)])
            .collect();
        let targets: Vec<f64> = rows.iter().map(|row| 2.0 * row[0] - 3.0 * row[1] + 5.0).collect();
        let model = LinearModel::fit(&rows, &targets);
        assert!((model.weights()[0] - 2.0).abs() < 1e-4);
        assert!((model.weights()[1] + 3.0).abs() < 1e-4);
        assert!((model.intercept() - 5.0).abs() < 1e-3);
        assert!((model.predict(&[10.0, 2.0]) - 19.0).abs() < 1e-3);
    }

    #[test]
    fn tolerates_a_constant_column() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i), 0.0]).collect();
        let targets: Vec<f64> = rows.iter().map(|row| 4.0 * row[0] + 1.0).collect();
        let model = LinearModel::fit(&rows, &targets);
        for (row, target) in rows.iter().zip(targets.iter()) {
            assert!((model.predict(row) - target).abs() < 1e-3);
        }
    }

    #[test]
    fn round_trips_through_json() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![f64::from(i)]).collect();
        let targets: Vec<f64> = rows.iter().map(|row| row[0] * 1.5).collect();
        let model = LinearModel::fit(&rows, &targets);
        let decoded: LinearModel =
            serde_json::from_str(&serde_json::to_string(&model).unwrap()).unwrap();
        assert!((model.predict(&[3.0]) - decoded.predict(&[3.0])).abs() < f64::EPSILON);
    }
}
