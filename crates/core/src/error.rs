//! Error taxonomy shared by every source and the repository

use scrape_widget_types::DefinitionError;
use thiserror::Error;

/// Errors raised by source construction, gathering and repository access
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("data source not found: {0}")]
    NotFound(String),

    #[error("data source name already in use: {0}")]
    DuplicateName(String),

    #[error("unsupported source definition: {0}")]
    UnsupportedDefinition(String),

    #[error("malformed source definition: {0}")]
    MalformedDefinition(String),

    #[error("invalid node selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid content filter: {0}")]
    InvalidFilter(String),

    #[error("document contains no node matching selector: {0}")]
    NoMatchingNode(String),

    #[error("node contains no text matching filter: {0}")]
    NoMatchingContent(String),

    #[error("metric unavailable: {0}")]
    Metric(String),

    /// Transport failure, passed through untouched
    #[error(transparent)]
    Fetch(anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gather task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

impl SourceError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SourceError::InvalidArgument(msg.into())
    }

    /// Create a range error
    pub fn out_of_range<S: Into<String>>(msg: S) -> Self {
        SourceError::OutOfRange(msg.into())
    }

    /// Wrap a transport error
    pub fn fetch<E: Into<anyhow::Error>>(err: E) -> Self {
        SourceError::Fetch(err.into())
    }

    /// True for failures of a single gather (as opposed to construction errors)
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            SourceError::NoMatchingNode(_)
                | SourceError::NoMatchingContent(_)
                | SourceError::Fetch(_)
                | SourceError::Metric(_)
                | SourceError::TaskFailed(_)
        )
    }
}

impl From<DefinitionError> for SourceError {
    fn from(err: DefinitionError) -> Self {
        match err {
            DefinitionError::Unsupported(msg) => SourceError::UnsupportedDefinition(msg),
            other => SourceError::MalformedDefinition(other.to_string()),
        }
    }
}
