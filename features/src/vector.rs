use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::Observation;

/// Column names in model order.
///
/// The trained models are positional: training and serving must build
/// vectors with exactly this layout or predictions silently misalign.
pub const FEATURE_NAMES: [&str; 10] = [
    "Temperature",
    "Rain",
    "Fog",
    "Visibility",
    "WindSpeed",
    "DayOfWeek",
    "Month",
    "DayOfYear",
    "Year",
    "Day",
];

/// The fixed ten-column feature vector.
///
/// Five readings carried through from the observation (the indicators
/// as 0/1), plus five fields derived purely from the calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Air temperature.
    pub temperature: f64,
    /// Rain indicator as 0/1.
    pub rain: f64,
    /// Fog indicator as 0/1.
    pub fog: f64,
    /// Visibility.
    pub visibility: f64,
    /// Wind speed.
    pub wind_speed: f64,
    /// Day of week, Monday=0 through Sunday=6.
    pub day_of_week: f64,
    /// Calendar month, 1-12.
    pub month: f64,
    /// Ordinal day within the year, 1-365/366.
    pub day_of_year: f64,
    /// Four-digit year.
    pub year: f64,
    /// Day of month, 1-31.
    pub day: f64,
}

impl FeatureVector {
    /// Number of columns.
    pub const WIDTH: usize = FEATURE_NAMES.len();

    /// Derives the full vector from a validated observation.
    #[must_use]
    pub fn from_observation(observation: &Observation) -> Self {
        let date = observation.date;
        Self {
            temperature: observation.temperature,
            rain: f64::from(u8::from(observation.rain)),
            fog: f64::from(u8::from(observation.fog)),
            visibility: observation.visibility,
            wind_speed: observation.wind_speed,
            day_of_week: f64::from(date.weekday().num_days_from_monday()),
            month: f64::from(date.month()),
            day_of_year: f64::from(date.ordinal()),
            year: f64::from(date.year()),
            day: f64::from(date.day()),
        }
    }

    /// Columns in [`FEATURE_NAMES`] order.
    #[must_use]
    pub const fn as_array(&self) -> [f64; Self::WIDTH] {
        [
            self.temperature,
            self.rain,
            self.fog,
            self.visibility,
            self.wind_speed,
            self.day_of_week,
            self.month,
            self.day_of_year,
            self.year,
            self.day,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_date, DateFormat};

    fn observation(date: &str, format: DateFormat) -> Observation {
        Observation::new(parse_date(date, format).unwrap(), 15.5, false, false, 8.0, 12.0)
    }

    #[test]
    fn batch_and_live_paths_derive_identical_vectors() {
        let batch = FeatureVector::from_observation(&observation("15-03-2024", DateFormat::Batch));
        let live = FeatureVector::from_observation(&observation("2024-03-15", DateFormat::Live));
        assert_eq!(batch, live);
        assert_eq!(batch.as_array(), live.as_array());
    }

    #[test]
    fn calendar_fields_for_a_known_friday() {
        let vector = FeatureVector::from_observation(&observation("2024-03-15", DateFormat::Live));
        assert!((vector.day - 15.0).abs() < f64::EPSILON);
        assert!((vector.month - 3.0).abs() < f64::EPSILON);
        assert!((vector.year - 2024.0).abs() < f64::EPSILON);
        assert!((vector.day_of_week - 4.0).abs() < f64::EPSILON);
        assert!((vector.day_of_year - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn day_of_year_60_on_leap_and_non_leap_boundaries() {
        let leap = FeatureVector::from_observation(&observation("29-02-2024", DateFormat::Batch));
        assert!((leap.day_of_year - 60.0).abs() < f64::EPSILON);

        let non_leap = FeatureVector::from_observation(&observation("01-03-2023", DateFormat::Batch));
        assert!((non_leap.day_of_year - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weekday_runs_monday_zero_to_sunday_six() {
        // 2024-03-11 is a Monday.
        for (offset, expected) in (0..7).zip(0..7) {
            let date = format!("2024-03-{}", 11 + offset);
            let vector = FeatureVector::from_observation(&observation(&date, DateFormat::Live));
            assert!((vector.day_of_week - f64::from(expected)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn indicators_map_to_unit_columns() {
        let mut obs = observation("2024-03-15", DateFormat::Live);
        obs.rain = true;
        obs.fog = true;
        let vector = FeatureVector::from_observation(&obs);
        assert!((vector.rain - 1.0).abs() < f64::EPSILON);
        assert!((vector.fog - 1.0).abs() < f64::EPSILON);
    }
}
