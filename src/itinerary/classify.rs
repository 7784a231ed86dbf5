//! Field classification for stops.
//!
//! Turns one stop into its ordered section list:
//! 1. Activities, Dining, Details from the recognized sequences
//! 2. one section per unrecognized sequence or record field, in source order
//!
//! Unrecognized scalars (and nulls) produce nothing. That drop is kept as-is:
//! a stray `weatherTempC: 21` never shows up in the rendered stop.
//!
//! Flattening is one level deep. Values nested inside an item are shown as
//! compact JSON text rather than expanded into further sections.

use serde_json::{Map, Value};

use crate::itinerary::types::{FieldShape, Stop};
use crate::itinerary::view_models::Section;
use crate::utils::humanize;

/// Recognized sequences, in display order.
const KNOWN_SECTIONS: [&str; 3] = ["Activities", "Dining", "Details"];

/// Build the ordered section list for a stop. Empty sections are never
/// returned.
pub fn classify(stop: &Stop) -> Vec<Section> {
    let known = [&stop.activities, &stop.dining, &stop.details];

    let mut sections: Vec<Section> = KNOWN_SECTIONS
        .iter()
        .zip(known)
        .map(|(title, items)| Section::new(*title, items.iter().map(known_item_text).collect()))
        .collect();

    for field in &stop.extra {
        let items = match &field.shape {
            FieldShape::Sequence(elements) => {
                elements.iter().filter_map(sequence_item_text).collect()
            }
            FieldShape::Record(map) => flatten_pairs(map),
            FieldShape::Scalar(_) => continue,
        };
        sections.push(Section::new(humanize(&field.key), items));
    }

    sections.retain(|s| !s.items.is_empty());
    sections
}

/// Items of Activities / Dining / Details: strings verbatim, a record's
/// `text` when it has one, otherwise compact JSON.
fn known_item_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("text") {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            _ => item.to_string(),
        },
        other => other.to_string(),
    }
}

/// Element of an unrecognized sequence. Nulls are skipped.
fn sequence_item_text(element: &Value) -> Option<String> {
    match FieldShape::of(element) {
        FieldShape::Scalar(Value::Null) => None,
        FieldShape::Scalar(scalar) => Some(display_value(&scalar)),
        FieldShape::Record(map) => Some(flatten_pairs(&map).join(", ")),
        FieldShape::Sequence(_) => Some(element.to_string()),
    }
}

/// "Humanized key: value" for every pair of a record, in source order.
fn flatten_pairs(map: &Map<String, Value>) -> Vec<String> {
    map.iter()
        .map(|(k, v)| format!("{}: {}", humanize(k), display_value(v)))
        .collect()
}

/// Strings unquoted; everything else in compact JSON form.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
