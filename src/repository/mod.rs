//! Data sources repository
//!
//! Owns every data source of the application: the built-in metric sources
//! plus one source per definition file found in the storage directory.
//! Sources are shared as `Arc<RwLock<Source>>` so subscribers can be
//! attached while the scheduler keeps gathering.

mod loader;
mod scheduler;

pub use loader::DEFINITION_EXTENSION;
pub use scheduler::GatherReport;

use log::{debug, info};
use scrape_widget_core::{DataSource, Result, SourceError};
use scrape_widget_sources::{builtin_sources, HttpFetcher, PageFetcher, Source};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A data source shared between the repository, the scheduler and callers
pub type SharedSource = Arc<RwLock<Source>>;

/// Pool of uniquely named data sources
pub struct DataSourcesRepository {
    sources: RwLock<HashMap<String, SharedSource>>,
}

impl DataSourcesRepository {
    /// Load every definition under `directory` and add the built-in sources.
    ///
    /// Website elements fetch their pages over HTTPS with a shared client.
    pub fn from_directory(directory: impl AsRef<Path>, recursive: bool) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new()?);
        Self::from_directory_with_fetcher(directory, recursive, fetcher)
    }

    /// Like `from_directory`, with pages fetched through `fetcher`.
    ///
    /// Fails on a missing directory, an unreadable, unsupported or invalid
    /// definition, or a name used twice. Nothing is gathered yet.
    pub fn from_directory_with_fetcher(
        directory: impl AsRef<Path>,
        recursive: bool,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self> {
        let directory = directory.as_ref();
        let files = loader::definition_files(directory, recursive)?;

        let mut sources = HashMap::new();
        for source in builtin_sources()? {
            insert_unique(&mut sources, source)?;
        }
        for file in &files {
            let source = loader::load_source(file, fetcher.clone())?;
            insert_unique(&mut sources, source)?;
        }

        info!(
            "Loaded {} data source(s) from {} ({} definition file(s))",
            sources.len(),
            directory.display(),
            files.len()
        );

        Ok(Self {
            sources: RwLock::new(sources),
        })
    }

    /// Add a source at runtime. Its name must not be in use.
    pub async fn add_source(&self, source: Source) -> Result<()> {
        let mut sources = self.sources.write().await;
        insert_unique(&mut sources, source)
    }

    /// Get a source by name
    pub async fn lookup(&self, name: &str) -> Result<SharedSource> {
        self.sources
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(name.to_string()))
    }

    /// Names of all sources, sorted
    pub async fn source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.sources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sources.read().await.is_empty()
    }

    /// Drop every source without subscribers and return the removed names.
    ///
    /// Waits for in-flight gathers of the inspected sources to finish.
    pub async fn prune_unsubscribed(&self) -> Vec<String> {
        let mut sources = self.sources.write().await;

        let mut unsubscribed = Vec::new();
        for (name, source) in sources.iter() {
            if !source.read().await.is_subscribed() {
                unsubscribed.push(name.clone());
            }
        }

        unsubscribed.sort();
        for name in &unsubscribed {
            sources.remove(name);
        }

        if !unsubscribed.is_empty() {
            info!(
                "Pruned {} unsubscribed data source(s), {} left",
                unsubscribed.len(),
                sources.len()
            );
        }
        unsubscribed
    }

    /// Clone out the pool so no lock is held while gathering
    async fn snapshot(&self) -> Vec<(String, SharedSource)> {
        self.sources
            .read()
            .await
            .iter()
            .map(|(name, source)| (name.clone(), source.clone()))
            .collect()
    }
}

fn insert_unique(sources: &mut HashMap<String, SharedSource>, source: Source) -> Result<()> {
    let name = source.name().to_string();
    if sources.contains_key(&name) {
        return Err(SourceError::DuplicateName(name));
    }

    debug!("Registered {} '{}'", source.kind(), name);
    sources.insert(name, Arc::new(RwLock::new(source)));
    Ok(())
}
