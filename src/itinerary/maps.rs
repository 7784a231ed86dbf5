//! Map collaborator for stops with coordinates.
//!
//! The tree only carries placeholder ids and raw "lat,lng" strings. A
//! collaborator is handed each placeholder once the tree exists; whatever it
//! fails on (bad coordinates, no map library) is logged and skipped.

use thiserror::Error;

use crate::itinerary::view_models::DisclosureTree;
use crate::utils::escape_html;

/// Zoom level every stop map opens at.
pub const DEFAULT_ZOOM: u8 = 13;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

#[derive(Error, Debug, PartialEq)]
pub enum MapError {
    #[error("Malformed coordinate {0:?}, expected \"lat,lng\"")]
    MalformedCoordinate(String),

    #[error("Map backend unavailable: {0}")]
    Unavailable(String),
}

/// Initializes one map per placeholder: centred on the coordinate at the
/// default zoom, with a single marker there.
pub trait MapCollaborator {
    fn init_map(&mut self, placeholder_id: &str, coordinates: &str) -> Result<(), MapError>;
}

/// Hand every map placeholder in the tree to the collaborator.
///
/// Returns how many maps were initialized. Failures never propagate.
pub fn attach_maps(tree: &DisclosureTree, collaborator: &mut dyn MapCollaborator) -> usize {
    let mut initialized = 0;
    for placeholder in tree.map_placeholders() {
        match collaborator.init_map(&placeholder.id, &placeholder.coordinates) {
            Ok(()) => initialized += 1,
            Err(e) => tracing::warn!("Skipping map {}: {}", placeholder.id, e),
        }
    }
    initialized
}

/// Parse "lat,lng" into two finite numbers.
pub fn parse_lat_lng(coordinates: &str) -> Result<(f64, f64), MapError> {
    let malformed = || MapError::MalformedCoordinate(coordinates.to_string());

    let (lat, lng) = coordinates.split_once(',').ok_or_else(malformed)?;
    let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;
    let lng: f64 = lng.trim().parse().map_err(|_| malformed())?;

    if lat.is_finite() && lng.is_finite() {
        Ok((lat, lng))
    } else {
        Err(malformed())
    }
}

/// Collects Leaflet initialization calls for the HTML page.
///
/// The emitted script is guarded on `window.L`, so a page without the
/// Leaflet library simply shows empty map slots.
#[derive(Debug, Clone)]
pub struct LeafletScript {
    zoom: u8,
    calls: Vec<String>,
}

impl Default for LeafletScript {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM)
    }
}

impl LeafletScript {
    pub fn new(zoom: u8) -> Self {
        Self {
            zoom,
            calls: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Complete `<script>` body, or an empty string when there are no maps.
    pub fn script(&self) -> String {
        if self.calls.is_empty() {
            return String::new();
        }

        let mut js = String::with_capacity(256 + self.calls.len() * 256);
        js.push_str("(function() {\n");
        js.push_str("  if (!window.L) return;\n");
        js.push_str("  function stopMap(id, lat, lng, zoom) {\n");
        js.push_str("    if (!document.getElementById(id)) return;\n");
        js.push_str("    var map = L.map(id).setView([lat, lng], zoom);\n");
        js.push_str(&format!(
            "    L.tileLayer('{}', {{ attribution: '{}' }}).addTo(map);\n",
            TILE_URL, TILE_ATTRIBUTION
        ));
        js.push_str("    L.marker([lat, lng]).addTo(map);\n");
        js.push_str("  }\n");
        for call in &self.calls {
            js.push_str("  ");
            js.push_str(call);
            js.push('\n');
        }
        js.push_str("})();\n");
        js
    }
}

impl MapCollaborator for LeafletScript {
    fn init_map(&mut self, placeholder_id: &str, coordinates: &str) -> Result<(), MapError> {
        let (lat, lng) = parse_lat_lng(coordinates)?;
        // ids come from document data; keep them inert inside the script
        let id = escape_html(placeholder_id).replace('\\', "\\\\");
        self.calls.push(format!(
            "stopMap(\"{}\", {}, {}, {});",
            id, lat, lng, self.zoom
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::types::Document;
    use crate::itinerary::view_builder::build;
    use serde_json::json;

    #[test]
    fn test_parse_lat_lng() {
        assert_eq!(parse_lat_lng("48.8606,2.3376"), Ok((48.8606, 2.3376)));
        assert_eq!(parse_lat_lng(" 48.8606 , 2.3376 "), Ok((48.8606, 2.3376)));
        assert!(parse_lat_lng("Paris").is_err());
        assert!(parse_lat_lng("48.8,").is_err());
        assert!(parse_lat_lng("NaN,2").is_err());
    }

    #[test]
    fn test_attach_maps_skips_bad_coordinates() {
        let document = Document::from_value(&json!([{
            "date": "2024-05-01",
            "stops": [
                { "id": "louvre", "coordinates": "48.8606,2.3376" },
                { "id": "nowhere", "coordinates": "somewhere" },
                { "id": "walk" }
            ]
        }]))
        .unwrap();
        let tree = build(&document);

        let mut leaflet = LeafletScript::default();
        assert_eq!(attach_maps(&tree, &mut leaflet), 1);
        assert_eq!(leaflet.len(), 1);

        let script = leaflet.script();
        assert!(script.contains("if (!window.L) return;"));
        assert!(script.contains("stopMap(\"map-louvre\", 48.8606, 2.3376, 13);"));
        assert!(!script.contains("map-nowhere"));
    }

    #[test]
    fn test_collaborator_called_once_per_placeholder() {
        struct Counting(Vec<(String, String)>);

        impl MapCollaborator for Counting {
            fn init_map(&mut self, id: &str, coordinates: &str) -> Result<(), MapError> {
                self.0.push((id.to_string(), coordinates.to_string()));
                Err(MapError::Unavailable("no tiles".to_string()))
            }
        }

        let document = Document::from_value(&json!([
            { "date": "d1", "stops": [{ "coordinates": "1,2" }] },
            { "date": "d2", "stops": [{ "name": "x" }, { "coordinates": "not,numbers" }] }
        ]))
        .unwrap();
        let tree = build(&document);

        let mut counting = Counting(Vec::new());
        assert_eq!(attach_maps(&tree, &mut counting), 0);
        assert_eq!(
            counting.0,
            vec![
                ("map#1-1".to_string(), "1,2".to_string()),
                ("map#2-2".to_string(), "not,numbers".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_script_without_maps() {
        assert_eq!(LeafletScript::default().script(), "");
    }
}
