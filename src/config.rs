//! Runtime configuration from environment variables.
//!
//! | Variable         | Default          |
//! |------------------|------------------|
//! | `ITINERARY_PATH` | `itinerary.json` |
//! | `STATE_PATH`     | unset (in-memory state only) |
//! | `PORT`           | `3000`           |
//! | `PAGE_TITLE`     | `Itinerary`      |
//! | `MAP_ZOOM`       | `13`             |

use std::path::PathBuf;

use crate::itinerary::maps::DEFAULT_ZOOM;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub itinerary_path: PathBuf,
    pub state_path: Option<PathBuf>,
    pub port: u16,
    pub page_title: String,
    pub map_zoom: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            itinerary_path: PathBuf::from("itinerary.json"),
            state_path: None,
            port: 3000,
            page_title: "Itinerary".to_string(),
            map_zoom: DEFAULT_ZOOM,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            itinerary_path: lookup("ITINERARY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.itinerary_path),
            state_path: lookup("STATE_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            page_title: lookup("PAGE_TITLE").unwrap_or(defaults.page_title),
            map_zoom: lookup("MAP_ZOOM")
                .and_then(|z| z.parse().ok())
                .unwrap_or(defaults.map_zoom),
        }
    }
}
