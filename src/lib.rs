//! scrape-widget: periodic data gathering from web pages and local metrics
//!
//! This library provides the data gathering engine of scrape-widget:
//! - A repository owning the pool of data sources, built from a directory
//!   of definitions plus the built-in metric sources
//! - A periodic scheduler refreshing every source on its own cadence
//! - Application configuration
//!
//! Source implementations live in `scrape-widget-sources`; the shared traits
//! and error types in `scrape-widget-core`.

pub mod config;
pub mod repository;

// Re-export commonly used types
pub use config::AppConfig;
pub use repository::{DataSourcesRepository, GatherReport, SharedSource};
pub use scrape_widget_core::{
    ChannelSubscriber, DataSource, DataSourceSubscriber, SourceError, SourceUpdate,
};
pub use scrape_widget_sources::{HttpFetcher, PageFetcher, Source, WebsiteElement};
