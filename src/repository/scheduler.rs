//! Periodic refresh of the sources in a repository

use super::{DataSourcesRepository, SharedSource};
use log::{error, trace, warn};
use scrape_widget_core::{DataSource, Result, SourceError, TICK_INTERVAL};
use tokio::time::Instant;

/// Outcome of one batch of gathers
///
/// Every source in the batch ends up in exactly one of the two lists. A
/// failure never keeps the other sources of the batch from being gathered.
#[derive(Debug, Default)]
pub struct GatherReport {
    /// Names of the sources gathered successfully
    pub refreshed: Vec<String>,
    /// Sources whose gather failed, with the error
    pub failures: Vec<(String, SourceError)>,
}

impl GatherReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of sources the batch touched
    pub fn gathered(&self) -> usize {
        self.refreshed.len() + self.failures.len()
    }

    /// Turn the report into the first failure, if any
    pub fn into_result(self) -> Result<()> {
        match self.failures.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }
}

impl DataSourcesRepository {
    /// Gather every source once, regardless of its refresh rate
    pub async fn gather_all(&self) -> GatherReport {
        let batch = self.snapshot().await;
        gather_batch(batch).await
    }

    /// Gather the sources whose refresh is due at `now`.
    ///
    /// A source is due when it was never refreshed or its refresh rate has
    /// elapsed since the last successful gather. Sources still locked by a
    /// gather from an earlier tick are skipped.
    pub async fn refresh_due_sources_at(&self, now: Instant) -> GatherReport {
        let due: Vec<(String, SharedSource)> = {
            let sources = self.sources.read().await;
            sources
                .iter()
                .filter(|(name, source)| match source.try_read() {
                    Ok(guard) => guard.state().is_due(now),
                    Err(_) => {
                        trace!("'{}' is busy, skipping this tick", name);
                        false
                    }
                })
                .map(|(name, source)| (name.clone(), source.clone()))
                .collect()
        };

        gather_batch(due).await
    }

    /// Gather the sources that are due now
    pub async fn refresh_due_sources(&self) -> GatherReport {
        self.refresh_due_sources_at(Instant::now()).await
    }

    /// Start the refresh loop
    ///
    /// Runs indefinitely: refresh the due sources, then wait `TICK_INTERVAL`.
    /// Failures are logged and the source is retried on the next tick.
    pub async fn run_periodic_refresh(&self) {
        loop {
            let start = Instant::now();
            let report = self.refresh_due_sources_at(start).await;

            let elapsed = start.elapsed();
            trace!(
                "Refresh cycle gathered {} source(s) in {:?}",
                report.gathered(),
                elapsed
            );

            tokio::time::sleep(TICK_INTERVAL).await;
        }
    }
}

/// Gather each source of the batch on its own task and wait for all of them
async fn gather_batch(batch: Vec<(String, SharedSource)>) -> GatherReport {
    let tasks: Vec<_> = batch
        .into_iter()
        .map(|(name, source)| {
            let gathered = source.clone();
            let task = tokio::spawn(async move {
                let mut source_guard = gathered.write().await;
                source_guard.gather().await
            });
            (name, source, task)
        })
        .collect();

    let mut report = GatherReport::default();
    for (name, source, task) in tasks {
        match task.await {
            Ok(Ok(())) => report.refreshed.push(name),
            Ok(Err(e)) => {
                if e.is_extraction_failure() {
                    warn!("Error gathering data source {}: {}", name, e);
                } else {
                    error!("Data source {} is unusable: {}", name, e);
                }
                report.failures.push((name, e));
            }
            Err(e) => {
                error!("Gather task for data source {} failed: {}", name, e);
                let err = SourceError::TaskFailed(e.to_string());
                source.write().await.state_mut().record_failure(&err);
                report.failures.push((name, err));
            }
        }
    }

    report.refreshed.sort();
    report
}
