use crate::itinerary::view_models::DisclosureTree;

/// JSON formatter for itinerary trees
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format tree as pretty-printed JSON
    pub fn format(tree: &DisclosureTree) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(tree)
    }

    /// Format tree as compact JSON (no whitespace)
    pub fn format_compact(tree: &DisclosureTree) -> Result<String, serde_json::Error> {
        serde_json::to_string(tree)
    }
}
