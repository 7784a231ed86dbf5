//! Renderings of a built itinerary tree.
//!
//! - HTML: nested `<details>` page with map and persistence scripts
//! - Markdown: printable outline, every node expanded
//! - JSON: the tree as-is

pub mod markdown;
pub mod json;
pub mod html;

pub use markdown::MarkdownFormatter;
pub use json::JsonFormatter;
pub use html::{HtmlFormatter, HtmlOptions};
