#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Candidate training, holdout evaluation, and model selection.
//!
//! One explicit entry point, [`train`], partitions the cleaned
//! historical dataset with a seeded split, fits the fixed roster of
//! three regressors, scores them on the holdout, and packages the best
//! performer as a [`SelectedModel`] artifact that the serving process
//! loads with [`SelectedModel::load`]. Nothing trains as a side effect
//! of anything else.

mod artifact;
mod error;
mod frame;
mod metrics;
mod models;
mod selector;
mod split;

pub use artifact::SelectedModel;
pub use error::{ArtifactError, PredictionError, TrainingError};
pub use frame::{TrainingFrame, TrainingSample};
pub use metrics::{mean_squared_error, r_squared};
pub use models::{
    BoostedModel, FittedModel, ForestModel, LinearModel, ModelKind, RegressionTree, TreeParams,
    BOOSTING_LEARNING_RATE, BOOSTING_MAX_DEPTH, ENSEMBLE_SIZE,
};
pub use selector::{
    train, Evaluation, TrainingOptions, TrainingOutcome, DEFAULT_HOLDOUT_FRACTION, DEFAULT_SEED,
};
