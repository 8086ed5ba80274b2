use thiserror::Error;

/// Fatal faults in the one-shot training run.
///
/// Training is a batch job: any of these aborts the run, no partial or
/// degraded model is ever produced.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Filesystem I/O failure while reading the dataset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed CSV (including non-numeric reading cells).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// A row had no delay target.
    #[error("row {row}: missing delay target")]
    MissingTarget {
        /// 1-based data row number.
        row: usize,
    },
    /// No usable rows survived date cleaning.
    #[error("dataset has no usable rows ({dropped} dropped for unparseable dates)")]
    EmptyDataset {
        /// Rows discarded because their date failed to parse.
        dropped: usize,
    },
    /// Not enough rows for both partitions of the holdout split.
    #[error("dataset too small to split: {rows} usable rows")]
    TooFewRows {
        /// Usable rows after date cleaning.
        rows: usize,
    },
    /// Holdout fraction outside (0, 1).
    #[error("holdout fraction {0} is outside (0, 1)")]
    InvalidHoldoutFraction(f64),
}

/// Faults loading or saving the persisted model artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Filesystem I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The artifact bytes were not a valid model document.
    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fault evaluating the fitted model on a feature vector.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The artifact's column schema does not match the serving schema.
    #[error("feature schema mismatch: artifact expects {expected} columns, vector has {actual}")]
    SchemaMismatch {
        /// Columns recorded in the artifact.
        expected: usize,
        /// Columns supplied by the caller.
        actual: usize,
    },
}
