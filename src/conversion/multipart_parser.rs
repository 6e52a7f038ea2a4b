use actix_multipart::Multipart;
use futures_util::StreamExt;
use log::{debug, warn};

use super::validator::{validate_metadata, validate_size, Upload};
use super::ValidationError;

/// Form field carrying the Markdown document.
pub const MARKDOWN_FIELD: &str = "markdown";

pub struct MultipartParser;

impl MultipartParser {
    /// Pull the `markdown` file out of a multipart form.
    ///
    /// The type check runs as soon as the field headers arrive and the size
    /// check runs per chunk, so a rejected upload is never fully buffered.
    /// Other fields are skipped.
    pub async fn parse_markdown_upload(mut multipart: Multipart) -> Result<Upload, ValidationError> {
        let mut upload: Option<Upload> = None;

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| ValidationError::Multipart(e.to_string()))?;
            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| ValidationError::Multipart("Content disposition not found".to_string()))?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| ValidationError::Multipart("Field name not found".to_string()))?;

            if name != MARKDOWN_FIELD {
                debug!("Skipping multipart field '{}'", name);
                continue;
            }
            if upload.is_some() {
                warn!("Ignoring additional '{}' field", MARKDOWN_FIELD);
                continue;
            }

            let filename = content_disposition
                .get_filename()
                .map(|s| s.to_string())
                .ok_or(ValidationError::MissingFile)?;
            let media_type = field.content_type().map(|m| m.essence_str().to_string());

            validate_metadata(media_type.as_deref(), &filename)?;

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| ValidationError::Multipart(e.to_string()))?;
                validate_size(bytes.len() + data.len())?;
                bytes.extend_from_slice(&data);
            }

            debug!("Received '{}' ({} bytes)", filename, bytes.len());
            upload = Some(Upload {
                bytes,
                media_type,
                filename,
            });
        }

        upload.ok_or(ValidationError::MissingFile)
    }
}
