//! On-disk source definitions
//!
//! One JSON document per file. The `source_type` tag selects the kind of
//! source the document describes:
//!
//! ```json
//! {
//!     "source_type": "website_element",
//!     "name": "gold-price",
//!     "description": "Spot price of gold.",
//!     "data_unit": "USD",
//!     "refresh_rate": "PT1M",
//!     "website_url": "https://example.com/gold",
//!     "node_selector": "span.price",
//!     "content_filter": "\\d+(\\.\\d+)?"
//! }
//! ```

use crate::duration::parse_iso8601_duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while classifying or decoding a definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("unsupported source definition: {0}")]
    Unsupported(String),

    #[error("malformed source definition: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid ISO-8601 duration: {0}")]
    InvalidDuration(String),
}

/// Definition of a scraped website element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteElementDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_unit: String,
    /// ISO-8601 duration, e.g. `PT30S`
    pub refresh_rate: String,
    pub website_url: String,
    pub node_selector: String,
    pub content_filter: String,
}

impl WebsiteElementDefinition {
    /// Decode the refresh rate field
    pub fn refresh_rate(&self) -> Result<Duration, DefinitionError> {
        parse_iso8601_duration(&self.refresh_rate)
    }
}

/// Type-safe enum for all externally definable sources.
/// Uses serde tag for JSON serialization: {"source_type": "website_element", ...}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source_type")]
pub enum SourceDefinition {
    #[serde(rename = "website_element")]
    WebsiteElement(WebsiteElementDefinition),
}

impl SourceDefinition {
    /// Tags recognized in the `source_type` field
    pub const KINDS: &'static [&'static str] = &["website_element"];

    /// Get the source type tag
    pub fn source_type(&self) -> &'static str {
        match self {
            SourceDefinition::WebsiteElement(_) => "website_element",
        }
    }

    /// Name of the defined source
    pub fn name(&self) -> &str {
        match self {
            SourceDefinition::WebsiteElement(def) => &def.name,
        }
    }

    /// Classify and decode a JSON document.
    ///
    /// A document without a known `source_type` is `Unsupported`; a known
    /// kind whose fields don't decode is `Malformed`.
    pub fn from_json_str(text: &str) -> Result<Self, DefinitionError> {
        let value: Value = serde_json::from_str(text)?;

        let kind = match value.get("source_type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(other) => {
                return Err(DefinitionError::Unsupported(format!(
                    "source_type is not a string: {}",
                    other
                )))
            }
            None => {
                return Err(DefinitionError::Unsupported(
                    "missing source_type".to_string(),
                ))
            }
        };

        if !Self::KINDS.contains(&kind.as_str()) {
            return Err(DefinitionError::Unsupported(format!(
                "unknown source_type '{}'",
                kind
            )));
        }

        log::trace!("Decoding '{}' definition", kind);
        Ok(serde_json::from_value(value)?)
    }

    /// Encode as pretty JSON
    pub fn to_json_string(&self) -> Result<String, DefinitionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
