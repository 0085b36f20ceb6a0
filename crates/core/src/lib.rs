//! scrape-widget-core: Core traits and shared state for scrape-widget.
//!
//! This crate contains the fundamental traits (`DataSource`,
//! `DataSourceSubscriber`), the state every source variant shares, the error
//! taxonomy and the scheduling constants.

pub mod constants;
mod data_source;
mod error;
mod subscriber;

pub use constants::{MIN_REFRESH_RATE, TICK_INTERVAL};
pub use data_source::{notify_subscribers, DataSource, SourceState};
pub use error::{Result, SourceError};
pub use subscriber::{ChannelSubscriber, DataSourceSubscriber};

// Re-export types used in trait signatures for convenience
pub use scrape_widget_types::SourceUpdate;
