use std::{io::Read, path::Path};

use serde::Deserialize;

use railcast_features::{parse_date, DateFormat, FeatureVector, Observation};

use crate::error::TrainingError;

/// One derived training sample.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    /// Feature columns.
    pub features: FeatureVector,
    /// Observed delay in minutes (regression target).
    pub target: f64,
}

/// The cleaned training dataset, ready for splitting.
#[derive(Debug, Clone, Default)]
pub struct TrainingFrame {
    /// Usable samples in file order.
    pub samples: Vec<TrainingSample>,
    /// Rows discarded because their date failed to parse.
    ///
    /// The drop is deliberate data cleaning, but it is counted so a run
    /// that quietly loses half its rows is visible in reports and logs.
    pub dropped_rows: usize,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Temperature")]
    temperature: f64,
    #[serde(rename = "Rain")]
    rain: u8,
    #[serde(rename = "Fog")]
    fog: u8,
    #[serde(rename = "Visibility")]
    visibility: f64,
    #[serde(rename = "WindSpeed")]
    wind_speed: f64,
    #[serde(rename = "Delay")]
    delay: Option<f64>,
}

impl TrainingFrame {
    /// Loads the historical dataset from a CSV file.
    ///
    /// Dates use the batch layout (`DD-MM-YYYY`). Rows with unparseable
    /// dates are dropped and counted; a malformed reading cell or a
    /// missing `Delay` aborts the load.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, TrainingError> {
        let reader = csv::Reader::from_path(path)?;
        Self::from_csv(reader)
    }

    /// Loads the historical dataset from any CSV reader.
    pub fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, TrainingError> {
        let mut frame = Self::default();
        for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row?;
            let target = row.delay.ok_or(TrainingError::MissingTarget { row: index + 1 })?;
            let Ok(date) = parse_date(&row.date, DateFormat::Batch) else {
                frame.dropped_rows += 1;
                continue;
            };
            let observation = Observation::new(
                date,
                row.temperature,
                row.rain != 0,
                row.fog != 0,
                row.visibility,
                row.wind_speed,
            );
            frame.samples.push(TrainingSample {
                features: FeatureVector::from_observation(&observation),
                target,
            });
        }
        if frame.samples.is_empty() {
            return Err(TrainingError::EmptyDataset {
                dropped: frame.dropped_rows,
            });
        }
        Ok(frame)
    }

    /// Builds a frame from pre-validated observation/target pairs.
    #[must_use]
    pub fn from_observations(pairs: &[(Observation, f64)]) -> Self {
        Self {
            samples: pairs
                .iter()
                .map(|(observation, target)| TrainingSample {
                    features: FeatureVector::from_observation(observation),
                    target: *target,
                })
                .collect(),
            dropped_rows: 0,
        }
    }

    /// Number of usable samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the frame holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Splits into parallel column-row/target vectors for the fitters.
    #[must_use]
    pub fn matrix(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows = self
            .samples
            .iter()
            .map(|sample| sample.features.as_array().to_vec())
            .collect();
        let targets = self.samples.iter().map(|sample| sample.target).collect();
        (rows, targets)
    }
}
