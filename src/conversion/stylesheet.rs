//! Stylesheet lookup for rendered documents.

use std::path::{Path, PathBuf};

use log::{debug, info};

use super::staging::StagingLocation;
use super::StagingError;

/// File name used for the generated fallback stylesheet.
pub const DEFAULT_STYLESHEET_NAME: &str = "pdf-style.css";

/// Fallback CSS written into the staging location when no shared stylesheet
/// is found.
pub const DEFAULT_CSS: &str = r#"body { font-family: Arial, sans-serif; margin: 2cm; }
h1, h2, h3 { color: #333; }
pre { background: #f5f5f5; padding: 1em; border-radius: 3px; }
code { font-family: monospace; }
"#;

/// Scans a fixed, ordered list of candidate paths.
#[derive(Debug, Clone)]
pub struct StylesheetResolver {
    candidates: Vec<PathBuf>,
    verbose: bool,
}

impl StylesheetResolver {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            verbose: false,
        }
    }

    /// Log every candidate probe at `info` instead of `debug`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// First existing candidate, in list order.
    pub fn find_existing(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .find(|candidate| {
                let exists = candidate.is_file();
                if self.verbose {
                    info!("Checking CSS path: {:?} - exists: {}", candidate, exists);
                } else {
                    debug!("Checking CSS path: {:?} - exists: {}", candidate, exists);
                }
                exists
            })
            .map(PathBuf::as_path)
    }

    /// Resolve exactly one stylesheet for the render. Falls back to writing
    /// [`DEFAULT_CSS`] into `location` so it is removed with everything else.
    pub fn resolve(&self, location: &StagingLocation) -> Result<PathBuf, StagingError> {
        if let Some(found) = self.find_existing() {
            return Ok(found.to_path_buf());
        }

        let path = location
            .write_file(DEFAULT_STYLESHEET_NAME, DEFAULT_CSS.as_bytes())
            .map_err(StagingError::WriteStylesheet)?;
        info!("Created default CSS at: {:?}", path);
        Ok(path)
    }
}
