//! Markdown to PDF conversion.
//!
//! One request walks through:
//! - `multipart_parser` + `validator` - receive and check the upload
//! - `staging` - private per-request working directory
//! - `stylesheet` - pick the CSS applied to the document
//! - `renderer` / `engine` - turn the staged Markdown into a PDF
//! - `delivery` - build the attachment response
//!
//! `pipeline` ties these together and `handlers` exposes them over HTTP.

pub mod delivery;
pub mod engine;
pub mod handlers;
pub mod multipart_parser;
pub mod pipeline;
pub mod renderer;
pub mod staging;
pub mod stylesheet;
pub mod validator;

pub use engine::HtmlCommandRenderer;
pub use pipeline::{ConversionPipeline, ConversionStage, RenderedArtifact};
pub use renderer::{DialectOptions, RenderJob, Renderer};
pub use staging::{StagingLocation, StagingStore};
pub use stylesheet::StylesheetResolver;
pub use validator::{Upload, MAX_UPLOAD_BYTES};

use std::path::PathBuf;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::ErrorResponse;

/// Upload problems the caller can fix by resubmitting.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No markdown file uploaded")]
    MissingFile,
    #[error("Only markdown files are allowed! (got {filename:?} as {media_type})")]
    UnsupportedType { filename: String, media_type: String },
    #[error("File too large (limit is {limit} bytes)")]
    TooLarge { limit: usize },
    #[error("Malformed multipart upload: {0}")]
    Multipart(String),
}

/// Filesystem failures around the per-request working directory.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create staging directory under {root:?}: {source}")]
    Allocate {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write staged input: {0}")]
    WriteInput(#[source] std::io::Error),
    #[error("failed to write default stylesheet: {0}")]
    WriteStylesheet(#[source] std::io::Error),
    #[error("renderer reported success but produced no output at {0:?}")]
    MissingOutput(PathBuf),
    #[error("failed to read rendered output: {0}")]
    ReadOutput(#[source] std::io::Error),
}

/// Failures of the Markdown to PDF renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read staged markdown: {0}")]
    ReadInput(#[source] std::io::Error),
    #[error("failed to read stylesheet: {0}")]
    ReadStylesheet(#[source] std::io::Error),
    #[error("failed to launch renderer command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to stream document to renderer: {0}")]
    Stdin(#[source] std::io::Error),
    #[error("renderer exited with status {code}: {stderr}")]
    Exit { code: i32, stderr: String },
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("conversion task failed: {0}")]
    Internal(String),
}

impl ConvertError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::UnsupportedType { .. }) => {
                "Only markdown files are allowed!".to_string()
            }
            Self::Validation(e) => e.to_string(),
            Self::Render(_) => "Error generating PDF".to_string(),
            Self::Staging(_) | Self::Internal(_) => "Error converting markdown to PDF".to_string(),
        }
    }

    /// Build the JSON error response. `verbose` adds the underlying cause.
    pub fn to_response(&self, verbose: bool) -> HttpResponse {
        let mut body = ErrorResponse::new(&self.public_message());
        if verbose {
            body = body.with_message(&self.to_string());
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<ConvertError> for HttpResponse {
    fn from(error: ConvertError) -> Self {
        error.to_response(false)
    }
}
