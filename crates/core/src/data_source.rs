//! Data source trait and the state shared by every source variant

use crate::constants::MIN_REFRESH_RATE;
use crate::error::{Result, SourceError};
use crate::subscriber::DataSourceSubscriber;
use chrono::{DateTime, Local};
use scrape_widget_types::{normalize_description, SourceUpdate};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Common state of a data source
///
/// Holds the identity, scheduling parameters, the last gathered value and
/// the ordered list of subscribers. Values are only ever written through
/// `record_success` / `record_failure`, so the value and its timestamps
/// always change together.
pub struct SourceState {
    name: String,
    description: String,
    data_unit: String,
    refresh_rate: Duration,
    /// Monotonic time of the last successful gather (None = never)
    last_refresh: Option<Instant>,
    /// Wall-clock time of the last successful gather
    refreshed_at: Option<DateTime<Local>>,
    gathered_value: Option<String>,
    last_failure: Option<String>,
    subscribers: Vec<Arc<dyn DataSourceSubscriber>>,
}

impl SourceState {
    /// Create and validate the common state of a source.
    ///
    /// The name must not be blank and the refresh rate must be at least
    /// `MIN_REFRESH_RATE`. The description is normalized; it may end up
    /// empty. An empty data unit is allowed.
    pub fn new(
        name: impl Into<String>,
        description: &str,
        data_unit: impl Into<String>,
        refresh_rate: Duration,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SourceError::invalid_argument("data source name is blank"));
        }

        if refresh_rate < MIN_REFRESH_RATE {
            return Err(SourceError::out_of_range(format!(
                "refresh rate of '{}' is {:?}, minimum is {:?}",
                name, refresh_rate, MIN_REFRESH_RATE
            )));
        }

        Ok(Self {
            name,
            description: normalize_description(description),
            data_unit: data_unit.into(),
            refresh_rate,
            last_refresh: None,
            refreshed_at: None,
            gathered_value: None,
            last_failure: None,
            subscribers: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn data_unit(&self) -> &str {
        &self.data_unit
    }

    pub fn refresh_rate(&self) -> Duration {
        self.refresh_rate
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Local>> {
        self.refreshed_at
    }

    /// True once a gather has succeeded
    pub fn has_data(&self) -> bool {
        self.gathered_value.is_some()
    }

    /// Last gathered value.
    ///
    /// Reading before the first successful gather is an `InvalidState`
    /// error; check `has_data` first.
    pub fn gathered_value(&self) -> Result<&str> {
        self.gathered_value.as_deref().ok_or_else(|| {
            SourceError::InvalidState(format!(
                "data of '{}' accessed before the first gather",
                self.name
            ))
        })
    }

    /// Message of the most recent failed gather, cleared by the next success
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Check whether the source should be gathered at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.refresh_rate,
        }
    }

    /// Store a freshly gathered value together with its timestamps
    pub fn record_success(&mut self, value: String, at: Instant) {
        self.gathered_value = Some(value);
        self.last_refresh = Some(at);
        self.refreshed_at = Some(Local::now());
        self.last_failure = None;
    }

    /// Remember a failed gather. Timestamps stay untouched so the source
    /// remains due on the next tick.
    pub fn record_failure(&mut self, err: &SourceError) {
        self.last_failure = Some(err.to_string());
    }

    /// Register a subscriber. Registering the same subscriber (same
    /// allocation) twice is a no-op.
    pub fn add_subscriber(&mut self, subscriber: Arc<dyn DataSourceSubscriber>) {
        if self
            .subscribers
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &subscriber))
        {
            return;
        }
        self.subscribers.push(subscriber);
    }

    pub fn subscribers(&self) -> &[Arc<dyn DataSourceSubscriber>] {
        &self.subscribers
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_subscribed(&self) -> bool {
        !self.subscribers.is_empty()
    }

    /// Owned snapshot of the current value, if any
    pub fn snapshot(&self) -> Option<SourceUpdate> {
        Some(SourceUpdate {
            name: self.name.clone(),
            value: self.gathered_value.clone()?,
            data_unit: self.data_unit.clone(),
            refreshed_at: self.refreshed_at?,
        })
    }
}

impl fmt::Debug for SourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceState")
            .field("name", &self.name)
            .field("data_unit", &self.data_unit)
            .field("refresh_rate", &self.refresh_rate)
            .field("gathered_value", &self.gathered_value)
            .field("last_failure", &self.last_failure)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Trait for all data sources
///
/// A data source is one independently scheduled producer of a single scalar
/// value. Implementors only expose their `SourceState`; everything a
/// consumer needs is derived from it.
pub trait DataSource: Send + Sync {
    /// Get the common state
    fn state(&self) -> &SourceState;

    /// Get the common state mutably
    fn state_mut(&mut self) -> &mut SourceState;

    /// Short identifier of the source kind, e.g. `website_element`
    fn kind(&self) -> &'static str;

    fn name(&self) -> &str {
        self.state().name()
    }

    fn description(&self) -> &str {
        self.state().description()
    }

    fn data_unit(&self) -> &str {
        self.state().data_unit()
    }

    fn refresh_rate(&self) -> Duration {
        self.state().refresh_rate()
    }

    fn has_data(&self) -> bool {
        self.state().has_data()
    }

    fn gathered_value(&self) -> Result<&str> {
        self.state().gathered_value()
    }

    fn is_subscribed(&self) -> bool {
        self.state().is_subscribed()
    }

    fn add_subscriber(&mut self, subscriber: Arc<dyn DataSourceSubscriber>) {
        self.state_mut().add_subscriber(subscriber);
    }
}

/// Notify every subscriber of `source`, in registration order
pub fn notify_subscribers(source: &dyn DataSource) {
    for subscriber in source.state().subscribers() {
        subscriber.notify(source);
    }
}
