//! scrape-widget-types: Shared data types for scrape-widget.
//!
//! This crate contains pure data types (source definitions, the ISO-8601
//! duration codec, update events) that are shared across all scrape-widget
//! crates. Nothing in here performs I/O.

pub mod definition;
pub mod duration;
pub mod text;
pub mod update;

// Re-export commonly used types at the crate root for convenience
pub use definition::{DefinitionError, SourceDefinition, WebsiteElementDefinition};
pub use duration::{format_iso8601_duration, parse_iso8601_duration};
pub use text::normalize_description;
pub use update::SourceUpdate;
