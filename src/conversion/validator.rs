//! Upload acceptance rules.
//!
//! Checks only look at metadata and size, they never touch the filesystem.

use super::ValidationError;

/// Hard cap on the uploaded document size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const MARKDOWN_MEDIA_TYPE: &str = "text/markdown";
pub const MARKDOWN_EXTENSION: &str = ".md";

/// An uploaded document as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub media_type: Option<String>,
    pub filename: String,
}

/// Accept when the declared type is Markdown or the filename ends in `.md`.
///
/// The suffix match is case-sensitive on purpose: `NOTES.MD` with a generic
/// media type is rejected.
pub fn validate_metadata(media_type: Option<&str>, filename: &str) -> Result<(), ValidationError> {
    let declared_markdown = media_type
        .map(|m| m.split(';').next().unwrap_or("").trim() == MARKDOWN_MEDIA_TYPE)
        .unwrap_or(false);

    if declared_markdown || filename.ends_with(MARKDOWN_EXTENSION) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedType {
            filename: filename.to_string(),
            media_type: media_type.unwrap_or("unknown").to_string(),
        })
    }
}

/// Reject once the received byte count goes past [`MAX_UPLOAD_BYTES`].
pub fn validate_size(received: usize) -> Result<(), ValidationError> {
    if received > MAX_UPLOAD_BYTES {
        Err(ValidationError::TooLarge {
            limit: MAX_UPLOAD_BYTES,
        })
    } else {
        Ok(())
    }
}

impl Upload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_metadata(self.media_type.as_deref(), &self.filename)?;
        validate_size(self.bytes.len())
    }
}
