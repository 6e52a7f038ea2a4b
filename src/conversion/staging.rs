//! Per-request staging directories.
//!
//! A [`StagingLocation`] is a uniquely named directory under the configured
//! staging root. It holds the uploaded Markdown, the rendered PDF and, when no
//! shared stylesheet exists, the generated default stylesheet. It is removed
//! exactly once: by [`StagingLocation::release`] or, if that never ran, on drop.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;
use uuid::Uuid;

use super::StagingError;

const DIR_PREFIX: &str = "md-to-pdf-";

/// Allocates staging directories under a fixed root.
#[derive(Debug, Clone)]
pub struct StagingStore {
    root: PathBuf,
}

impl StagingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh directory named after a random v4 UUID.
    ///
    /// The directory is created with exclusive semantics, so an existing path
    /// is an error rather than a shared location.
    pub fn allocate(&self) -> Result<StagingLocation, StagingError> {
        let token = Uuid::new_v4().simple().to_string();
        let dir = tempfile::Builder::new()
            .prefix(&format!("{DIR_PREFIX}{token}"))
            .rand_bytes(0)
            .tempdir_in(&self.root)
            .map_err(|source| StagingError::Allocate {
                root: self.root.clone(),
                source,
            })?;

        debug!("Allocated staging directory {:?}", dir.path());
        Ok(StagingLocation {
            dir: Some(dir),
            output: None,
        })
    }
}

/// A request-private working directory.
#[derive(Debug)]
pub struct StagingLocation {
    dir: Option<TempDir>,
    output: Option<PathBuf>,
}

impl StagingLocation {
    pub fn path(&self) -> &Path {
        // `dir` is only taken by `release`/`drop`, both of which consume self.
        self.dir
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Write the uploaded bytes to `<random>.md` and remember the matching
    /// `<random>.pdf` output path. The client filename is never used on disk.
    pub fn write_input(&mut self, bytes: &[u8]) -> Result<PathBuf, StagingError> {
        let token = Uuid::new_v4().simple().to_string();
        let input = self.path().join(format!("{token}.md"));
        let output = self.path().join(format!("{token}.pdf"));

        fs::write(&input, bytes).map_err(StagingError::WriteInput)?;
        debug!("Staged {} bytes at {:?}", bytes.len(), input);

        self.output = Some(output);
        Ok(input)
    }

    /// Where the renderer is expected to write the PDF.
    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Write a file with a fixed name inside the location.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> Result<PathBuf, std::io::Error> {
        let path = self.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Read the rendered PDF back. A missing file means the renderer lied
    /// about succeeding.
    pub fn read_output(&self) -> Result<Vec<u8>, StagingError> {
        let output = self
            .output
            .as_ref()
            .ok_or_else(|| StagingError::MissingOutput(self.path().join("<no input staged>")))?;

        if !output.exists() {
            return Err(StagingError::MissingOutput(output.clone()));
        }
        fs::read(output).map_err(StagingError::ReadOutput)
    }

    /// Recursively delete the directory. Failures are logged, never returned.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!("Removed staging directory {:?}", path),
                Err(e) => warn!("Failed to remove staging directory {:?}: {}", path, e),
            }
        }
    }
}

impl Drop for StagingLocation {
    fn drop(&mut self) {
        if self.dir.is_some() {
            debug!("Staging location dropped without release, cleaning up");
            self.remove();
        }
    }
}
