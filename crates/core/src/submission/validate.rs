//! Structural validation of raw submission payloads.

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{Filters, Submission, TimeWindow, Traveler};

const REQUIRED_FIELDS: [&str; 5] = [
    "travelers",
    "destinations",
    "outbound_date",
    "return_date",
    "default_filters",
];

const TRAVELER_FIELDS: [&str; 3] = ["name", "origin_airport", "filters"];

/// The first problem found in a submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("{0} must be a non-empty list")]
    EmptyList(String),

    #[error("travelers[{index}] missing field: {field}")]
    TravelerMissingField { index: usize, field: String },

    #[error("{path} must be {expected}")]
    InvalidType { path: String, expected: &'static str },

    #[error("{path} must have 'earliest' and 'latest' fields")]
    InvalidTimeWindow { path: String },
}

impl ValidationError {
    /// Path of the offending field, e.g. `travelers` or `travelers[1].filters.max_stops`.
    pub fn field(&self) -> String {
        match self {
            ValidationError::NotAnObject => String::new(),
            ValidationError::MissingField(field) | ValidationError::EmptyList(field) => {
                field.clone()
            }
            ValidationError::TravelerMissingField { index, field } => {
                format!("travelers[{}].{}", index, field)
            }
            ValidationError::InvalidType { path, .. }
            | ValidationError::InvalidTimeWindow { path } => path.clone(),
        }
    }
}

/// Validate an untyped payload and build a [`Submission`] from it.
///
/// Fails fast on the first offending field.
pub fn validate_submission(payload: &Value) -> Result<Submission, ValidationError> {
    let data = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    for field in REQUIRED_FIELDS {
        if !data.contains_key(field) {
            return Err(ValidationError::MissingField(field.to_string()));
        }
    }

    let raw_travelers = non_empty_list(data, "travelers")?;
    let raw_destinations = non_empty_list(data, "destinations")?;

    let mut travelers = Vec::with_capacity(raw_travelers.len());
    for (index, raw) in raw_travelers.iter().enumerate() {
        travelers.push(validate_traveler(index, raw)?);
    }

    let default_filters = validate_filters(&data["default_filters"], "default_filters")?;

    let mut destinations: Vec<String> = Vec::with_capacity(raw_destinations.len());
    for (index, raw) in raw_destinations.iter().enumerate() {
        let code = raw.as_str().ok_or_else(|| ValidationError::InvalidType {
            path: format!("destinations[{}]", index),
            expected: "a string",
        })?;
        if !destinations.iter().any(|d| d == code) {
            destinations.push(code.to_string());
        }
    }

    Ok(Submission {
        travelers,
        destinations,
        outbound_date: string_field(data, "outbound_date", "outbound_date")?,
        return_date: string_field(data, "return_date", "return_date")?,
        default_filters,
    })
}

fn non_empty_list<'a>(
    data: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    match data.get(field).and_then(Value::as_array) {
        Some(list) if !list.is_empty() => Ok(list),
        _ => Err(ValidationError::EmptyList(field.to_string())),
    }
}

fn string_field(
    data: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, ValidationError> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ValidationError::InvalidType {
            path: path.to_string(),
            expected: "a string",
        })
}

fn validate_traveler(index: usize, raw: &Value) -> Result<Traveler, ValidationError> {
    let path = format!("travelers[{}]", index);
    let traveler = raw.as_object().ok_or_else(|| ValidationError::InvalidType {
        path: path.clone(),
        expected: "an object",
    })?;

    for field in TRAVELER_FIELDS {
        if !traveler.contains_key(field) {
            return Err(ValidationError::TravelerMissingField {
                index,
                field: field.to_string(),
            });
        }
    }

    let filters = validate_filters(&traveler["filters"], &format!("{}.filters", path))?;

    Ok(Traveler {
        name: string_field(traveler, "name", &format!("{}.name", path))?,
        origin: string_field(traveler, "origin_airport", &format!("{}.origin_airport", path))?,
        filters,
    })
}

fn validate_filters(raw: &Value, path: &str) -> Result<Filters, ValidationError> {
    let filters = raw.as_object().ok_or_else(|| ValidationError::InvalidType {
        path: path.to_string(),
        expected: "an object",
    })?;

    let non_stop_only = filters
        .get("non_stop_only")
        .and_then(Value::as_bool)
        .ok_or_else(|| ValidationError::InvalidType {
            path: format!("{}.non_stop_only", path),
            expected: "a boolean",
        })?;

    let excluded_airlines = filters
        .get("excluded_airlines")
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::InvalidType {
            path: format!("{}.excluded_airlines", path),
            expected: "a list",
        })?
        .iter()
        .map(|code| {
            code.as_str()
                .map(str::to_string)
                .ok_or_else(|| ValidationError::InvalidType {
                    path: format!("{}.excluded_airlines", path),
                    expected: "a list of strings",
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let max_stops = filters
        .get("max_stops")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ValidationError::InvalidType {
            path: format!("{}.max_stops", path),
            expected: "a non-negative integer",
        })?;

    Ok(Filters {
        non_stop_only,
        excluded_airlines,
        max_stops,
        outbound_departure: time_window(filters, "outbound_departure_window", path)?,
        outbound_arrival: time_window(filters, "outbound_arrival_window", path)?,
        return_departure: time_window(filters, "return_departure_window", path)?,
        return_arrival: time_window(filters, "return_arrival_window", path)?,
    })
}

fn time_window(
    filters: &Map<String, Value>,
    field: &str,
    path: &str,
) -> Result<Option<TimeWindow>, ValidationError> {
    let window = match filters.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(window) => window,
    };

    let bound = |key: &str| {
        window
            .as_object()
            .and_then(|w| w.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    match (bound("earliest"), bound("latest")) {
        (Some(earliest), Some(latest)) => Ok(Some(TimeWindow { earliest, latest })),
        _ => Err(ValidationError::InvalidTimeWindow {
            path: format!("{}.{}", path, field),
        }),
    }
}
