/// Mean squared error between predictions and observed targets.
///
/// Returns 0.0 for empty or mismatched slices; callers validate lengths
/// before scoring.
#[must_use]
pub fn mean_squared_error(predictions: &[f64], targets: &[f64]) -> f64 {
    if predictions.is_empty() || predictions.len() != targets.len() {
        return 0.0;
    }
    predictions
        .iter()
        .zip(targets.iter())
        .map(|(prediction, target)| (prediction - target).powi(2))
        .sum::<f64>()
        / predictions.len() as f64
}

/// Coefficient of determination (R²).
///
/// Defined as 0.0 when the target variance is zero (a degenerate
/// holdout, only reachable on toy data).
#[must_use]
pub fn r_squared(predictions: &[f64], targets: &[f64]) -> f64 {
    if predictions.is_empty() || predictions.len() != targets.len() {
        return 0.0;
    }
    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    let ss_total: f64 = targets.iter().map(|target| (target - mean).powi(2)).sum();
    if ss_total == 0.0 {
        return 0.0;
    }
    let ss_residual: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(prediction, target)| (target - prediction).powi(2))
        .sum();
    1.0 - ss_residual / ss_total
}
