//! Subscriber protocol for pushing fresh values to observers

use crate::data_source::DataSource;
use log::debug;
use scrape_widget_types::SourceUpdate;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Observer of a data source
///
/// `notify` is called synchronously, on whichever task performed the gather,
/// once per successful gather and after the source's state was updated.
/// It runs inline with the scheduler's batch, so implementations must
/// return quickly and never block.
pub trait DataSourceSubscriber: Send + Sync {
    fn notify(&self, source: &dyn DataSource);
}

impl<F> DataSourceSubscriber for F
where
    F: Fn(&dyn DataSource) + Send + Sync,
{
    fn notify(&self, source: &dyn DataSource) {
        self(source)
    }
}

/// Subscriber that forwards every update into a channel
///
/// Decouples slow consumers from the gather path: `notify` only enqueues
/// an owned `SourceUpdate`.
pub struct ChannelSubscriber {
    sender: mpsc::UnboundedSender<SourceUpdate>,
}

impl ChannelSubscriber {
    /// Create a subscriber and the receiving end of its channel
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<SourceUpdate>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }
}

impl DataSourceSubscriber for ChannelSubscriber {
    fn notify(&self, source: &dyn DataSource) {
        let Some(update) = source.state().snapshot() else {
            return;
        };
        if self.sender.send(update).is_err() {
            debug!("Update receiver for '{}' was dropped", source.name());
        }
    }
}
