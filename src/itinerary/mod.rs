//! Itinerary view engine
//!
//! Maps a loosely structured itinerary document onto a tree of disclosure
//! nodes: day -> stop -> section -> item.
//!
//! ## Modules
//! - `types` - document model, recognized stop fields, `FieldShape`
//! - `classify` - section lists for a stop (recognized + generic fields)
//! - `view_models` - tree node types and node keys
//! - `view_builder` - document -> `DisclosureTree`
//! - `interaction` - open/done toggles on a built tree
//! - `state` - keyed state store and persistence hooks
//! - `maps` - map collaborator for stop coordinates

pub mod types;
pub mod classify;
pub mod view_models;
pub mod view_builder;
pub mod interaction;
pub mod state;
pub mod maps;

pub use types::{Day, Document, FieldShape, Stop, UnrecognizedField};
pub use classify::classify;
pub use view_models::*;
pub use view_builder::{build, build_from_value, TreeBuilder};
pub use state::{NoopPersistence, PersistenceHooks, StateStore};
pub use maps::{attach_maps, LeafletScript, MapCollaborator, MapError};
