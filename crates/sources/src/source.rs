//! The closed set of source variants

use crate::cpu::ProcessorLoad;
use crate::memory::MemoryLoad;
use crate::website_element::WebsiteElement;
use log::debug;
use scrape_widget_core::{notify_subscribers, DataSource, Result, SourceState};
use tokio::time::Instant;

/// Every kind of data source the repository can hold
#[derive(Debug)]
pub enum Source {
    WebsiteElement(WebsiteElement),
    ProcessorLoad(ProcessorLoad),
    MemoryLoad(MemoryLoad),
}

impl Source {
    /// Gather a fresh value.
    ///
    /// On success the value and both timestamps are stored first, then every
    /// subscriber is notified in registration order. On failure the error
    /// is recorded on the source and returned; the refresh timestamp is left
    /// alone so the source stays due.
    pub async fn gather(&mut self) -> Result<()> {
        let sampled = match self {
            Source::WebsiteElement(element) => element.sample().await,
            Source::ProcessorLoad(load) => load.sample().await,
            Source::MemoryLoad(load) => load.sample(),
        };

        match sampled {
            Ok(value) => {
                debug!("Gathered '{}' = {}", self.name(), value);
                self.state_mut().record_success(value, Instant::now());
                notify_subscribers(&*self);
                Ok(())
            }
            Err(err) => {
                self.state_mut().record_failure(&err);
                Err(err)
            }
        }
    }

    /// Get the website element variant, if this is one
    pub fn as_website_element(&self) -> Option<&WebsiteElement> {
        match self {
            Source::WebsiteElement(element) => Some(element),
            _ => None,
        }
    }
}

impl DataSource for Source {
    fn state(&self) -> &SourceState {
        match self {
            Source::WebsiteElement(s) => s.state(),
            Source::ProcessorLoad(s) => s.state(),
            Source::MemoryLoad(s) => s.state(),
        }
    }

    fn state_mut(&mut self) -> &mut SourceState {
        match self {
            Source::WebsiteElement(s) => s.state_mut(),
            Source::ProcessorLoad(s) => s.state_mut(),
            Source::MemoryLoad(s) => s.state_mut(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Source::WebsiteElement(s) => s.kind(),
            Source::ProcessorLoad(s) => s.kind(),
            Source::MemoryLoad(s) => s.kind(),
        }
    }
}

impl From<WebsiteElement> for Source {
    fn from(element: WebsiteElement) -> Self {
        Source::WebsiteElement(element)
    }
}
