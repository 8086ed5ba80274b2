use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use railcast_features::{FeatureVector, FEATURE_NAMES};

use crate::{
    error::{ArtifactError, PredictionError},
    models::{FittedModel, ModelKind},
    selector::{Evaluation, TrainingOptions},
};

/// The persisted winner of a training run.
///
/// Serialized as a single JSON document; the serving process loads it
/// once at startup and treats it as immutable shared state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedModel {
    /// Winning candidate family.
    pub kind: ModelKind,
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// Seed the run used.
    pub seed: u64,
    /// Holdout fraction the run used.
    pub holdout_fraction: f64,
    /// Column schema the model was fitted against, in order.
    pub feature_names: Vec<String>,
    /// Rows in the training partition.
    pub training_rows: usize,
    /// Rows in the holdout partition.
    pub holdout_rows: usize,
    /// Rows dropped during date cleaning.
    pub dropped_rows: usize,
    /// Holdout scores for every candidate, in roster order.
    pub evaluations: Vec<Evaluation>,
    /// The fitted winner.
    pub fitted: FittedModel,
}

impl SelectedModel {
    /// Packages a fitted winner with its run metadata.
    #[must_use]
    pub fn assemble(
        fitted: FittedModel,
        options: &TrainingOptions,
        evaluations: &[Evaluation],
        training_rows: usize,
        holdout_rows: usize,
        dropped_rows: usize,
    ) -> Self {
        Self {
            kind: fitted.kind(),
            trained_at: Utc::now(),
            seed: options.seed,
            holdout_fraction: options.holdout_fraction,
            feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
            training_rows,
            holdout_rows,
            dropped_rows,
            evaluations: evaluations.to_vec(),
            fitted,
        }
    }

    /// Predicts the delay for one feature vector.
    ///
    /// Guards the positional contract: an artifact trained against a
    /// different column schema is rejected instead of silently
    /// misreading columns.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let row = features.as_array();
        if self.feature_names.len() != row.len() {
            return Err(PredictionError::SchemaMismatch {
                expected: self.feature_names.len(),
                actual: row.len(),
            });
        }
        Ok(self.fitted.predict(&row))
    }

    /// Predicts and rounds to two decimals for user-facing display.
    pub fn predict_rounded(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        self.predict(features).map(|value| (value * 100.0).round() / 100.0)
    }

    /// Holdout scores of the winning candidate.
    #[must_use]
    pub fn winning_scores(&self) -> Option<Evaluation> {
        self.evaluations
            .iter()
            .find(|evaluation| evaluation.model == self.kind)
            .copied()
    }

    /// Writes the artifact as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let encoded = serde_json::to_vec_pretty(self)?;
        fs::write(path, encoded)?;
        Ok(())
    }

    /// Loads an artifact written by [`SelectedModel::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
