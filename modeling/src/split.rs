use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::error::TrainingError;

/// Deterministic shuffle split into (training, holdout) index sets.
///
/// Same seed + same input order yields the identical partition on every
/// run; both partitions are guaranteed non-empty.
pub fn holdout_split(
    rows: usize,
    holdout_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), TrainingError> {
    if !(holdout_fraction > 0.0 && holdout_fraction < 1.0) {
        return Err(TrainingError::InvalidHoldoutFraction(holdout_fraction));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let holdout = ((rows as f64) * holdout_fraction).round() as usize;
    if holdout == 0 || holdout >= rows {
        return Err(TrainingError::TooFewRows { rows });
    }
    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(holdout);
    Ok((train, indices))
}
