//! Utility modules shared by the classifier and the formatters
//!
//! - Humanize: field key to display label
//! - Markup: HTML escaping and key slugs

pub mod humanize;
pub mod markup;

pub use humanize::humanize;
pub use markup::{escape_html, slugify};
