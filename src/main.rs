use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use scrape_widget::{AppConfig, ChannelSubscriber, DataSource, DataSourcesRepository};
use std::path::PathBuf;
use std::sync::Arc;

/// scrape-widget - Periodically scrape values from web pages and local metrics
#[derive(Parser, Debug, Clone)]
#[command(name = "scrape-widget")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the one in the platform config directory
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the source definition files (overrides the config)
    #[arg(short = 's', long = "sources-dir", value_name = "DIR")]
    sources_dir: Option<PathBuf>,

    /// Search subdirectories of the sources directory too
    #[arg(short = 'r', long = "recursive")]
    recursive: bool,

    /// Write the effective configuration (after flag overrides) and exit
    #[arg(long = "save-config", conflicts_with_all = ["list", "once"])]
    save_config: bool,

    /// Print the names of all data sources and exit
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Gather every source once, print the values and exit
    #[arg(short = 'o', long = "once", conflicts_with = "list")]
    once: bool,

    /// Only watch this source (repeatable). Watches all sources by default
    #[arg(short = 'w', long = "watch", value_name = "NAME")]
    watch: Vec<String>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting scrape-widget v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().context("Failed to load configuration")?,
    };
    if let Some(dir) = &cli.sources_dir {
        config.data_sources_storage = dir.clone();
    }
    if cli.recursive {
        config.recursive_search = true;
    }

    if cli.save_config {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => AppConfig::config_path()?,
        };
        config.save_to_path(&path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let repository = Arc::new(
        DataSourcesRepository::from_directory(
            &config.data_sources_storage,
            config.recursive_search,
        )
        .with_context(|| {
            format!(
                "Failed to load data sources from {}",
                config.data_sources_storage.display()
            )
        })?,
    );

    if cli.list {
        list_sources(&repository).await?;
        return Ok(());
    }

    if cli.once {
        return gather_once(&repository).await;
    }

    watch(repository, &cli.watch).await
}

/// Print name, kind and refresh rate of every source
async fn list_sources(repository: &DataSourcesRepository) -> Result<()> {
    for name in repository.source_names().await {
        let source = repository.lookup(&name).await?;
        let source = source.read().await;
        println!(
            "{:<24} {:<16} every {:?}",
            name,
            source.kind(),
            source.refresh_rate()
        );
    }
    Ok(())
}

/// Gather all sources once; fails if any source failed
async fn gather_once(repository: &DataSourcesRepository) -> Result<()> {
    let report = repository.gather_all().await;

    for name in &report.refreshed {
        let source = repository.lookup(name).await?;
        let source = source.read().await;
        if let Some(update) = source.state().snapshot() {
            println!("{:<24} {}", update.name, update.display_value());
        }
    }
    for (name, err) in &report.failures {
        println!("{:<24} FAILED: {}", name, err);
    }

    report
        .into_result()
        .context("Gathering data sources failed")
}

/// Subscribe to the watched sources and print every update until Ctrl-C
async fn watch(repository: Arc<DataSourcesRepository>, watched: &[String]) -> Result<()> {
    let (subscriber, mut updates) = ChannelSubscriber::new();

    let names = if watched.is_empty() {
        repository.source_names().await
    } else {
        watched.to_vec()
    };
    for name in &names {
        let source = repository
            .lookup(name)
            .await
            .with_context(|| format!("Cannot watch '{}'", name))?;
        source.write().await.add_subscriber(subscriber.clone());
    }

    let pruned = repository.prune_unsubscribed().await;
    if !pruned.is_empty() {
        info!("Not watching: {}", pruned.join(", "));
    }

    let scheduler = {
        let repository = repository.clone();
        tokio::spawn(async move { repository.run_periodic_refresh().await })
    };

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(update) => println!(
                    "{}  {:<24} {}",
                    update.refreshed_at.format("%H:%M:%S"),
                    update.name,
                    update.display_value()
                ),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, shutting down");
                break;
            }
        }
    }

    scheduler.abort();
    Ok(())
}
