//! Discovery and decoding of source definition files

use log::{debug, trace};
use scrape_widget_core::{Result, SourceError};
use scrape_widget_sources::{PageFetcher, Source, WebsiteElement};
use scrape_widget_types::SourceDefinition;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// File extension of definition files
pub const DEFINITION_EXTENSION: &str = "json";

/// List the definition files under `directory`, sorted by path.
///
/// Only the directory itself is searched unless `recursive` is set. Files
/// with any other extension are ignored.
pub(crate) fn definition_files(directory: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(directory).map_err(|e| {
        SourceError::Io(io::Error::new(
            e.kind(),
            format!("{}: {}", directory.display(), e),
        ))
    })?;

    if !metadata.is_dir() {
        return Err(SourceError::invalid_argument(format!(
            "not a directory: {}",
            directory.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(max_depth)
    {
        let entry = entry.map_err(|e| SourceError::Io(io::Error::from(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_definition_file(entry.path()) {
            files.push(entry.into_path());
        } else {
            trace!("Ignoring {}", entry.path().display());
        }
    }

    files.sort();
    Ok(files)
}

fn is_definition_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(DEFINITION_EXTENSION))
}

/// Read one definition file and build the source it describes
pub(crate) fn load_source(path: &Path, fetcher: Arc<dyn PageFetcher>) -> Result<Source> {
    let text = std::fs::read_to_string(path).map_err(|e| with_path(path, e.into()))?;

    let definition = SourceDefinition::from_json_str(&text)
        .map_err(|e| with_path(path, SourceError::from(e)))?;
    debug!(
        "Loading {} '{}' from {}",
        definition.source_type(),
        definition.name(),
        path.display()
    );

    match definition {
        SourceDefinition::WebsiteElement(definition) => {
            WebsiteElement::from_definition(&definition, fetcher)
                .map(Source::WebsiteElement)
                .map_err(|e| with_path(path, e))
        }
    }
}

/// Prefix definition errors with the offending file
fn with_path(path: &Path, err: SourceError) -> SourceError {
    let located = |msg: String| format!("{}: {}", path.display(), msg);
    match err {
        SourceError::UnsupportedDefinition(msg) => SourceError::UnsupportedDefinition(located(msg)),
        SourceError::MalformedDefinition(msg) => SourceError::MalformedDefinition(located(msg)),
        SourceError::InvalidArgument(msg) => SourceError::InvalidArgument(located(msg)),
        SourceError::OutOfRange(msg) => SourceError::OutOfRange(located(msg)),
        SourceError::InvalidSelector { selector, reason } => SourceError::InvalidSelector {
            selector,
            reason: located(reason),
        },
        SourceError::InvalidFilter(msg) => SourceError::InvalidFilter(located(msg)),
        SourceError::Io(e) => SourceError::Io(io::Error::new(e.kind(), located(e.to_string()))),
        other => other,
    }
}
