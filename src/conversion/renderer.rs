//! The Markdown to PDF rendering seam.

use std::path::PathBuf;

use super::RenderError;

/// Markdown dialect switches handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectOptions {
    /// Pass raw HTML through instead of escaping it.
    pub html: bool,
    /// Turn single newlines into `<br>`.
    pub breaks: bool,
    pub footnotes: bool,
    pub superscript: bool,
    pub subscript: bool,
}

impl DialectOptions {
    /// The fixed dialect used for every conversion.
    pub const STANDARD: DialectOptions = DialectOptions {
        html: true,
        breaks: true,
        footnotes: true,
        superscript: true,
        subscript: true,
    };
}

/// Everything a renderer needs for one document.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stylesheet: PathBuf,
    pub options: DialectOptions,
}

/// Converts a staged Markdown file into a PDF at `job.output`.
///
/// Implementations are called from the blocking thread pool and may block.
pub trait Renderer: Send + Sync {
    fn render(&self, job: &RenderJob) -> Result<(), RenderError>;

    /// Short human-readable description used in diagnostics.
    fn describe(&self) -> String {
        "custom renderer".to_string()
    }
}
