use thiserror::Error;

/// Errors that abort a render pass.
///
/// Absent optional fields, stray scalar fields and unparseable coordinates are
/// not errors; see `itinerary::classify` and `itinerary::maps`.
#[derive(Error, Debug)]
pub enum ItineraryError {
    #[error("Malformed itinerary document: {0}")]
    MalformedDocument(String),

    #[error("Failed to parse itinerary JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ItineraryError>;
