//! Itinerary document model.
//!
//! Input arrives as loosely structured JSON:
//! - Document: `{"days": [...]}` or a bare array of days
//! - Day: date, title, start/end, open, stops
//! - Stop: a handful of recognized fields plus any number of free-form ones
//!
//! Recognized stop fields are pulled into typed fields. Everything else is kept
//! in source key order as an `UnrecognizedField` whose value shape has been
//! inspected once into a `FieldShape`.

use serde_json::{Map, Value};

use crate::error::{ItineraryError, Result};

/// Stop fields with dedicated handling. Every other key goes through generic
/// classification.
pub const RECOGNIZED_STOP_FIELDS: [&str; 11] = [
    "id",
    "name",
    "description",
    "scheduledTime",
    "time",
    "duration",
    "done",
    "open",
    "activities",
    "dining",
    "details",
];

/// Time fields in priority order; the first one with a value wins.
pub const TIME_FIELDS: [&str; 3] = ["scheduledTime", "time", "duration"];

/// A complete itinerary, read once per render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub days: Vec<Day>,
}

/// One calendar date and its stops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Day {
    pub date: String,
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub open: Option<bool>,
    pub stops: Vec<Stop>,
}

/// A single waypoint within a day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stop {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Resolved from `scheduledTime`, `time`, `duration` (first present wins)
    pub time: Option<String>,
    pub done: bool,
    pub open: Option<bool>,
    pub activities: Vec<Value>,
    pub dining: Vec<Value>,
    pub details: Vec<Value>,
    /// Raw "lat,lng" string, never parsed here
    pub coordinates: Option<String>,
    /// Fields outside `RECOGNIZED_STOP_FIELDS`, in source key order
    pub extra: Vec<UnrecognizedField>,
}

/// A free-form stop field and the shape of its value.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedField {
    pub key: String,
    pub shape: FieldShape,
}

/// Runtime shape of a JSON value, decided once per field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    /// String, number, bool or null
    Scalar(Value),
    Sequence(Vec<Value>),
    Record(Map<String, Value>),
}

impl FieldShape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(items) => FieldShape::Sequence(items.clone()),
            Value::Object(map) => FieldShape::Record(map.clone()),
            scalar => FieldShape::Scalar(scalar.clone()),
        }
    }
}

impl Document {
    /// Parse a document from an already decoded JSON value.
    ///
    /// Fails fast: any structural problem rejects the whole document.
    pub fn from_value(value: &Value) -> Result<Self> {
        let days = match value {
            Value::Object(map) => match map.get("days") {
                Some(Value::Array(days)) => days,
                Some(_) => {
                    return Err(ItineraryError::MalformedDocument(
                        "`days` is not a sequence".to_string(),
                    ))
                }
                None => {
                    return Err(ItineraryError::MalformedDocument(
                        "missing `days` sequence".to_string(),
                    ))
                }
            },
            Value::Array(days) => days,
            Value::Null => {
                return Err(ItineraryError::MalformedDocument(
                    "document is empty".to_string(),
                ))
            }
            _ => {
                return Err(ItineraryError::MalformedDocument(
                    "expected an object with `days` or an array of days".to_string(),
                ))
            }
        };

        let days = days
            .iter()
            .enumerate()
            .map(|(i, day)| Day::from_value(i + 1, day))
            .collect::<Result<Vec<_>>>()?;

        Ok(Document { days })
    }

    /// Decode and parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn stop_count(&self) -> usize {
        self.days.iter().map(|d| d.stops.len()).sum()
    }
}

impl Day {
    fn from_value(position: usize, value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            ItineraryError::MalformedDocument(format!("day {} is not a record", position))
        })?;

        let stops = match map.get("stops") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(stops)) => stops
                .iter()
                .enumerate()
                .map(|(i, stop)| Stop::from_value(position, i + 1, stop))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(ItineraryError::MalformedDocument(format!(
                    "day {}: `stops` is not a sequence",
                    position
                )))
            }
        };

        Ok(Day {
            date: get_text(map, "date").unwrap_or_default(),
            title: get_text(map, "title"),
            start: get_text(map, "start"),
            end: get_text(map, "end"),
            open: map.get("open").and_then(Value::as_bool),
            stops,
        })
    }

    /// Number of stops whose `done` flag is set.
    pub fn completed(&self) -> usize {
        self.stops.iter().filter(|s| s.done).count()
    }
}

impl Stop {
    fn from_value(day: usize, position: usize, value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            ItineraryError::MalformedDocument(format!(
                "day {} stop {} is not a record",
                day, position
            ))
        })?;
        Ok(Self::from_map(map))
    }

    /// Split a stop record into recognized and free-form fields.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let time = TIME_FIELDS
            .iter()
            .find_map(|k| get_text(map, k).filter(|t| !t.is_empty()));

        let extra = map
            .iter()
            .filter(|(k, _)| !RECOGNIZED_STOP_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| UnrecognizedField {
                key: k.clone(),
                shape: FieldShape::of(v),
            })
            .collect();

        Stop {
            id: get_text(map, "id").filter(|s| !s.is_empty()),
            name: get_text(map, "name"),
            description: map
                .get("description")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            time,
            done: map.get("done").and_then(Value::as_bool).unwrap_or(false),
            open: map.get("open").and_then(Value::as_bool),
            activities: get_sequence(map, "activities"),
            dining: get_sequence(map, "dining"),
            details: get_sequence(map, "details"),
            coordinates: map
                .get("coordinates")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            extra,
        }
    }
}

/// Text of a string or number field. Other shapes count as absent.
pub fn get_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Elements of a sequence field; absent or non-sequence values give none.
fn get_sequence(map: &Map<String, Value>, key: &str) -> Vec<Value> {
    match map.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
