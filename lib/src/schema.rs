//! Raw input schema and validation.
//!
//! The input schema is fixed and domain specific: nineteen numeric
//! attributes describing a house. Validation happens before any feature
//! computation and reports *all* missing fields together, then the first
//! value that is non-numeric or out of range. A [`RawRecord`] can only be
//! obtained from untrusted input through [`RawRecord::from_json`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How a field's value is constrained.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Closed numeric range `[min, max]`.
    Range { min: f64, max: f64 },
    /// Must be exactly 0 or 1.
    Binary,
}

/// Declarative spec for one raw input field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn range(name: &'static str, min: f64, max: f64) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Range { min, max },
    }
}

/// The full input schema, in canonical field order.
pub const FIELDS: [FieldSpec; 19] = [
    range("bedrooms", 0.0, 20.0),
    range("bathrooms", 0.0, 20.0),
    range("living_area", 100.0, 50_000.0),
    range("lot_area", 100.0, 1_000_000.0),
    range("floors", 1.0, 10.0),
    FieldSpec {
        name: "waterfront",
        kind: FieldKind::Binary,
    },
    range("views", 0.0, 10.0),
    range("condition", 1.0, 10.0),
    range("grade", 1.0, 15.0),
    range("house_area", 100.0, 50_000.0),
    range("basement_area", 0.0, 10_000.0),
    range("built_year", 1800.0, 2024.0),
    range("renovation_year", 0.0, 2024.0),
    range("latitude", -90.0, 90.0),
    range("longitude", -180.0, 180.0),
    range("living_area_renovated", 0.0, 50_000.0),
    range("lot_area_renovated", 0.0, 1_000_000.0),
    range("schools_nearby", 0.0, 50.0),
    range("airport_distance", 0.0, 500.0),
];

/// A validated raw attribute record.
///
/// Field names match the schema names in [`FIELDS`] one to one, so the
/// serde representation round-trips with the HTTP request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub living_area: f64,
    pub lot_area: f64,
    pub floors: f64,
    pub waterfront: f64,
    pub views: f64,
    pub condition: f64,
    pub grade: f64,
    pub house_area: f64,
    pub basement_area: f64,
    pub built_year: f64,
    pub renovation_year: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub living_area_renovated: f64,
    pub lot_area_renovated: f64,
    pub schools_nearby: f64,
    pub airport_distance: f64,
}

/// Client input validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// One or more required fields absent or empty; lists every one.
    MissingFields(Vec<String>),
    /// Field present but not convertible to a number.
    NotNumeric { field: String },
    /// Field outside its closed range.
    OutOfRange { field: String, min: f64, max: f64 },
    /// Field must be exactly 0 or 1.
    NotBinary { field: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            ValidationError::NotNumeric { field } => {
                write!(f, "Invalid {} value. Must be a number.", field)
            }
            ValidationError::OutOfRange { field, min, max } => {
                write!(f, "{} must be between {} and {}", field, min, max)
            }
            ValidationError::NotBinary { field } => {
                write!(f, "{} must be 0 or 1", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Convert a JSON value to f64, accepting numbers and numeric strings.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// A field counts as missing when absent, null, or an empty string.
fn is_missing(map: &serde_json::Map<String, Value>, name: &str) -> bool {
    match map.get(name) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

impl RawRecord {
    /// Validate a JSON object against the schema and build a record.
    ///
    /// Presence is checked first across all fields so the error names every
    /// missing field, then each value is converted and range-checked in
    /// schema order, stopping at the first violation.
    pub fn from_json(map: &serde_json::Map<String, Value>) -> Result<Self, ValidationError> {
        let missing: Vec<String> = FIELDS
            .iter()
            .filter(|spec| is_missing(map, spec.name))
            .map(|spec| spec.name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let mut values = [0.0f64; FIELDS.len()];
        for (slot, spec) in values.iter_mut().zip(FIELDS.iter()) {
            let value = numeric_value(&map[spec.name]).ok_or(ValidationError::NotNumeric {
                field: spec.name.to_string(),
            })?;

            match spec.kind {
                FieldKind::Range { min, max } => {
                    if !(min..=max).contains(&value) {
                        return Err(ValidationError::OutOfRange {
                            field: spec.name.to_string(),
                            min,
                            max,
                        });
                    }
                }
                FieldKind::Binary => {
                    if value != 0.0 && value != 1.0 {
                        return Err(ValidationError::NotBinary {
                            field: spec.name.to_string(),
                        });
                    }
                }
            }

            *slot = value;
        }

        Ok(Self::from_ordered(&values))
    }

    /// Build a record from values laid out in [`FIELDS`] order.
    pub(crate) fn from_ordered(values: &[f64; 19]) -> Self {
        Self {
            bedrooms: values[0],
            bathrooms: values[1],
            living_area: values[2],
            lot_area: values[3],
            floors: values[4],
            waterfront: values[5],
            views: values[6],
            condition: values[7],
            grade: values[8],
            house_area: values[9],
            basement_area: values[10],
            built_year: values[11],
            renovation_year: values[12],
            latitude: values[13],
            longitude: values[14],
            living_area_renovated: values[15],
            lot_area_renovated: values[16],
            schools_nearby: values[17],
            airport_distance: values[18],
        }
    }
}
