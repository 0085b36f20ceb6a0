//! Memory (RAM) load data source implementation

use crate::cpu::format_load;
use once_cell::sync::Lazy;
use scrape_widget_core::{DataSource, Result, SourceError, SourceState};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use sysinfo::System;

const DESCRIPTION: &str = "Current RAM usage.";

/// Shared sysinfo::System instance for all MemoryLoad instances.
/// Memory counters are absolute, so one handle serves every source.
static SHARED_MEMORY_SYSTEM: Lazy<Mutex<System>> = Lazy::new(|| {
    log::info!("Creating shared Memory sysinfo::System instance");
    Mutex::new(System::new())
});

/// Read used memory as a percentage of total memory
fn read_memory_load() -> Result<f64> {
    // Recover from a poisoned mutex - the System handle is still usable
    let mut system = SHARED_MEMORY_SYSTEM.lock().unwrap_or_else(|poisoned| {
        log::warn!("Shared memory system mutex was poisoned, recovering");
        poisoned.into_inner()
    });

    system.refresh_memory();
    let total = system.total_memory();
    let used = system.used_memory();
    drop(system);

    if total == 0 {
        return Err(SourceError::Metric("total memory reported as zero".to_string()));
    }
    Ok(used as f64 / total as f64 * 100.0)
}

/// Memory load source
///
/// Reports used RAM in percent of total RAM, rounded to an integer.
pub struct MemoryLoad {
    state: SourceState,
}

impl MemoryLoad {
    pub fn new(name: &str, refresh_rate: Duration) -> Result<Self> {
        let state = SourceState::new(name, DESCRIPTION, "%", refresh_rate)?;

        // Prime the counter; the first reading is not reported
        let discarded = read_memory_load()?;
        log::trace!("Discarded first memory sample of '{}': {:.1}", name, discarded);

        Ok(Self { state })
    }

    /// Take one sample, formatted as a whole percentage
    pub(crate) fn sample(&self) -> Result<String> {
        format_load(read_memory_load()?)
    }
}

impl DataSource for MemoryLoad {
    fn state(&self) -> &SourceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SourceState {
        &mut self.state
    }

    fn kind(&self) -> &'static str {
        "memory_load"
    }
}

impl fmt::Debug for MemoryLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryLoad").field("state", &self.state).finish()
    }
}
