use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{debug, error, info};
use uuid::Uuid;

use super::delivery::attachment_filename;
use super::renderer::{DialectOptions, RenderJob, Renderer};
use super::staging::{StagingLocation, StagingStore};
use super::stylesheet::StylesheetResolver;
use super::validator::Upload;
use super::{ConvertError, StagingError};

/// Where a single conversion currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    Received,
    Validated,
    Staged,
    Rendering,
    Delivering,
    Cleaned,
    Failed,
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Staged => "staged",
            Self::Rendering => "rendering",
            Self::Delivering => "delivering",
            Self::Cleaned => "cleaned",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The PDF produced for one upload, ready to send.
#[derive(Debug)]
pub struct RenderedArtifact {
    pub bytes: Vec<u8>,
    /// Attachment filename, `<upload stem>.pdf`.
    pub filename: String,
}

/// Validate, stage, render, read back, clean up.
pub struct ConversionPipeline {
    staging: StagingStore,
    stylesheets: StylesheetResolver,
    renderer: Arc<dyn Renderer>,
    options: DialectOptions,
}

impl ConversionPipeline {
    pub fn new(staging: StagingStore, stylesheets: StylesheetResolver, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            staging,
            stylesheets,
            renderer,
            options: DialectOptions::STANDARD,
        }
    }

    pub fn staging(&self) -> &StagingStore {
        &self.staging
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// Run one conversion. Blocking; call from the blocking pool.
    ///
    /// The staging location is released before this returns on every path.
    pub fn convert(&self, upload: Upload, request_id: Uuid) -> Result<RenderedArtifact, ConvertError> {
        log_stage(request_id, ConversionStage::Received);

        if let Err(e) = upload.validate() {
            log_failure(request_id, ConversionStage::Received, &e);
            return Err(e.into());
        }
        log_stage(request_id, ConversionStage::Validated);

        let mut location = match self.staging.allocate() {
            Ok(location) => location,
            Err(e) => {
                log_failure(request_id, ConversionStage::Validated, &e);
                return Err(e.into());
            }
        };

        let result = self.convert_staged(&mut location, &upload, request_id);

        location.release();
        log_stage(request_id, ConversionStage::Cleaned);

        result.map(|bytes| {
            info!(
                "[{}] Converted '{}' ({} bytes of markdown, {} bytes of PDF)",
                request_id,
                upload.filename,
                upload.bytes.len(),
                bytes.len()
            );
            RenderedArtifact {
                bytes,
                filename: attachment_filename(&upload.filename),
            }
        })
    }

    fn convert_staged(
        &self,
        location: &mut StagingLocation,
        upload: &Upload,
        request_id: Uuid,
    ) -> Result<Vec<u8>, ConvertError> {
        let job = match self.stage(location, upload) {
            Ok(job) => job,
            Err(e) => {
                log_failure(request_id, ConversionStage::Validated, &e);
                return Err(e.into());
            }
        };
        log_stage(request_id, ConversionStage::Staged);

        log_stage(request_id, ConversionStage::Rendering);
        if let Err(e) = self.renderer.render(&job) {
            log_failure(request_id, ConversionStage::Rendering, &e);
            return Err(e.into());
        }

        log_stage(request_id, ConversionStage::Delivering);
        location.read_output().map_err(|e| {
            log_failure(request_id, ConversionStage::Delivering, &e);
            e.into()
        })
    }

    fn stage(&self, location: &mut StagingLocation, upload: &Upload) -> Result<RenderJob, StagingError> {
        let input = location.write_input(&upload.bytes)?;
        let output = location
            .output_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| StagingError::MissingOutput(location.path().to_path_buf()))?;
        let stylesheet = self.stylesheets.resolve(location)?;

        Ok(RenderJob {
            input,
            output,
            stylesheet,
            options: self.options,
        })
    }
}

fn log_stage(request_id: Uuid, stage: ConversionStage) {
    debug!("[{}] {}", request_id, stage);
}

fn log_failure(request_id: Uuid, from: ConversionStage, error: &dyn std::error::Error) {
    error!("[{}] {} -> {}: {}", request_id, from, ConversionStage::Failed, error);
}
