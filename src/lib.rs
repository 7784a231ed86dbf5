//! Itinerary View
//!
//! Renders loosely structured itinerary documents (days of stops with
//! free-form fields) as collapsible disclosure trees.
//!
//! - `itinerary/`: document model, field classification, tree building,
//!   open/done interaction, state store, map collaborator
//! - `formatters/`: HTML, Markdown and JSON output
//! - `utils/`: key humanization and markup helpers
//! - `api_server`: axum surface (feature `api`)

pub mod error;
pub mod config;
pub mod utils;
pub mod itinerary;
pub mod formatters;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use error::ItineraryError;
pub use config::ServerConfig;
pub use utils::humanize;
pub use itinerary::{
    attach_maps, build, build_from_value, classify, DisclosureTree, Document, NodeKey,
    PersistenceHooks, Section, StateStore, TreeBuilder,
};
pub use formatters::{HtmlFormatter, HtmlOptions, JsonFormatter, MarkdownFormatter};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
