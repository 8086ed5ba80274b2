use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{parse_date, DateFormat, InputError};

/// One validated observation: a calendar date plus five readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date of the journey.
    pub date: NaiveDate,
    /// Air temperature in degrees Celsius.
    pub temperature: f64,
    /// Rain indicator.
    pub rain: bool,
    /// Fog indicator.
    pub fog: bool,
    /// Visibility in kilometres.
    pub visibility: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
}

impl Observation {
    /// Builds an observation from already-validated values.
    #[must_use]
    pub const fn new(
        date: NaiveDate,
        temperature: f64,
        rain: bool,
        fog: bool,
        visibility: f64,
        wind_speed: f64,
    ) -> Self {
        Self {
            date,
            temperature,
            rain,
            fog,
            visibility,
            wind_speed,
        }
    }

    /// Validates and coerces a raw observation.
    ///
    /// The date is parsed with the caller-selected format; readings
    /// arrive as loose JSON values (numbers, numeric strings, booleans
    /// for the indicators) and are coerced here so a bad field surfaces
    /// as [`InputError`] instead of a downstream model fault.
    pub fn from_raw(raw: &RawObservation, format: DateFormat) -> Result<Self, InputError> {
        Ok(Self {
            date: parse_date(&raw.date, format)?,
            temperature: coerce_number("temperature", &raw.temperature)?,
            rain: coerce_flag("rain", &raw.rain)?,
            fog: coerce_flag("fog", &raw.fog)?,
            visibility: coerce_number("visibility", &raw.visibility)?,
            wind_speed: coerce_number("windspeed", &raw.windspeed)?,
        })
    }
}

/// Observation fields exactly as supplied by a client, before
/// validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    /// Date string in the caller's format.
    pub date: String,
    /// Temperature reading.
    pub temperature: Value,
    /// Rain indicator (0/1).
    pub rain: Value,
    /// Fog indicator (0/1).
    pub fog: Value,
    /// Visibility reading.
    pub visibility: Value,
    /// Wind speed reading.
    pub windspeed: Value,
}

fn coerce_number(field: &'static str, value: &Value) -> Result<f64, InputError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|number| number.is_finite())
        .ok_or_else(|| InputError::InvalidReading {
            field,
            value: value.to_string(),
        })
}

fn coerce_flag(field: &'static str, value: &Value) -> Result<bool, InputError> {
    let parsed = match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_f64() {
            Some(n) if n == 0.0 => Some(false),
            Some(n) if n == 1.0 => Some(true),
            _ => None,
        },
        Value::String(text) => match text.trim() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| InputError::InvalidFlag {
        field,
        value: value.to_string(),
    })
}
