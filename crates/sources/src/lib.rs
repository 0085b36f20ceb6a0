//! scrape-widget-sources: Data source implementations for scrape-widget.
//!
//! Website elements are scraped over HTTPS through the extraction pipeline;
//! processor and memory load are sampled from OS counters via sysinfo.

mod cpu;
pub mod extraction;
mod fetcher;
mod memory;
mod source;
mod website_element;

pub use cpu::ProcessorLoad;
pub use extraction::{compile_filter, extract, filter_content, scrape_once, select_node, NodeSelector};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use memory::MemoryLoad;
pub use source::Source;
pub use website_element::WebsiteElement;

use scrape_widget_core::Result;
use std::time::Duration;

/// Name of the built-in processor load source
pub const PROCESSOR_USAGE: &str = "processor-usage";

/// Name of the built-in memory load source
pub const RAM_USAGE: &str = "ram-usage";

/// Create the built-in local metric sources
pub fn builtin_sources() -> Result<Vec<Source>> {
    Ok(vec![
        Source::ProcessorLoad(ProcessorLoad::new(PROCESSOR_USAGE, Duration::from_secs(2))?),
        Source::MemoryLoad(MemoryLoad::new(RAM_USAGE, Duration::from_secs(3))?),
    ])
}
