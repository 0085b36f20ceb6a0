//! Processor load data source implementation

use scrape_widget_core::{DataSource, Result, SourceError, SourceState};
use std::fmt;
use std::time::{Duration, Instant};
use sysinfo::{CpuRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};

const DESCRIPTION: &str = "Current CPU usage.";

/// Processor load source
///
/// Reports global CPU usage in percent, rounded to an integer. Each instance
/// owns its sysinfo handle because usage is computed from the difference
/// between two consecutive refreshes of that handle.
pub struct ProcessorLoad {
    state: SourceState,
    system: System,
    /// Time of the discarded priming refresh, until the first real sample
    primed_at: Option<Instant>,
}

impl ProcessorLoad {
    pub fn new(name: &str, refresh_rate: Duration) -> Result<Self> {
        let state = SourceState::new(name, DESCRIPTION, "%", refresh_rate)?;

        // Initialize system with CPU refresh configuration
        let mut system = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
        );

        // The first reading of a fresh handle has no baseline and is meaningless
        system.refresh_cpu_all();
        let discarded = system.global_cpu_usage();
        log::trace!("Discarded first CPU sample of '{}': {}", name, discarded);

        Ok(Self {
            state,
            system,
            primed_at: Some(Instant::now()),
        })
    }

    /// Take one sample, formatted as a whole percentage.
    ///
    /// The first sample waits until `MINIMUM_CPU_UPDATE_INTERVAL` has passed
    /// since the priming refresh, so it covers a meaningful window.
    pub(crate) async fn sample(&mut self) -> Result<String> {
        if let Some(primed_at) = self.primed_at.take() {
            let remaining =
                (primed_at + MINIMUM_CPU_UPDATE_INTERVAL).saturating_duration_since(Instant::now());
            if !remaining.is_zero() {
                log::trace!("Waiting {:?} for the first CPU sample of '{}'", remaining, self.name());
                tokio::time::sleep(remaining).await;
            }
        }

        self.system.refresh_cpu_all();
        format_load(self.system.global_cpu_usage() as f64)
    }
}

/// Round a load percentage to the nearest integer, base 10, no unit
pub(crate) fn format_load(load: f64) -> Result<String> {
    if !load.is_finite() || load < 0.0 {
        return Err(SourceError::Metric(format!("invalid load reading: {}", load)));
    }
    Ok(format!("{}", load.round() as u64))
}

impl DataSource for ProcessorLoad {
    fn state(&self) -> &SourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SourceState {
        &mut self.state
    }

    fn kind(&self) -> &'static str {
        "processor_load"
    }
}

impl fmt::Debug for ProcessorLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorLoad")
            .field("state", &self.state)
            .field("cpus", &self.system.cpus().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_format_load_rounds_to_integer() {
        assert_eq!(format_load(0.0).unwrap(), "0");
        assert_eq!(format_load(12.4).unwrap(), "12");
        assert_eq!(format_load(12.5).unwrap(), "13");
        assert_eq!(format_load(99.97).unwrap(), "100");
    }

    #[test]
    fn test_format_load_rejects_garbage() {
        assert!(matches!(format_load(f64::NAN), Err(SourceError::Metric(_))));
        assert!(matches!(format_load(-1.0), Err(SourceError::Metric(_))));
    }

    #[tokio::test]
    async fn test_processor_load_samples_percentage() {
        let mut source = ProcessorLoad::new("cpu", Duration::from_secs(2)).unwrap();
        assert_eq!(source.data_unit(), "%");
        assert_eq!(source.description(), DESCRIPTION);
        assert!(!source.has_data());

        let value: u64 = source.sample().await.unwrap().parse().unwrap();
        assert!(value <= 100);
    }

    #[tokio::test]
    async fn test_first_sample_waits_for_settle_interval() {
        let built = Instant::now();
        let mut source = ProcessorLoad::new("cpu", Duration::from_secs(2)).unwrap();

        source.sample().await.unwrap();
        assert!(built.elapsed() >= MINIMUM_CPU_UPDATE_INTERVAL);
        assert!(source.primed_at.is_none());

        // Later samples don't wait again
        let again = Instant::now();
        source.sample().await.unwrap();
        assert!(again.elapsed() < MINIMUM_CPU_UPDATE_INTERVAL);
    }

    #[tokio::test]
    async fn test_sample_right_after_construction_matches_settled_load() {
        let stop = Arc::new(AtomicBool::new(false));
        let spinner = {
            let stop = stop.clone();
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    std::hint::spin_loop();
                }
            })
        };
        std::thread::sleep(Duration::from_millis(100));

        let mut source = ProcessorLoad::new("cpu", Duration::from_secs(2)).unwrap();
        let first: i64 = source.sample().await.unwrap().parse().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        let settled: i64 = source.sample().await.unwrap().parse().unwrap();

        stop.store(true, Ordering::Relaxed);
        spinner.join().unwrap();

        assert!(
            (first - settled).abs() <= 25,
            "first sample {} far from settled load {}",
            first,
            settled
        );
    }

    #[test]
    fn test_processor_load_respects_refresh_floor() {
        let err = ProcessorLoad::new("cpu", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SourceError::OutOfRange(_)));
    }
}
