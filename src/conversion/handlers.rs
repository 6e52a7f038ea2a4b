use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{debug, error, info};
use uuid::Uuid;

use super::delivery::pdf_response;
use super::multipart_parser::MultipartParser;
use super::ConvertError;
use crate::state::AppState;
use crate::ErrorResponse;

#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct ConvertRequest {
    /// Markdown file (`.md` or `text/markdown`, at most 10 MiB).
    #[allow(unused)]
    pub markdown: Vec<u8>,
}

#[utoipa::path(
    tag = "Conversion",
    post,
    path = "/convert",
    request_body(content = inline(ConvertRequest), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Rendered PDF attachment (application/pdf)"),
        (status = 400, description = "Missing, rejected or oversized upload", body = ErrorResponse),
        (status = 500, description = "Staging or rendering failed", body = ErrorResponse)
    )
)]
pub async fn convert_markdown(
    req: HttpRequest,
    payload: Multipart,
    data: web::Data<AppState>,
) -> impl Responder {
    let request_id = Uuid::new_v4();
    let verbose = data.config.verbose_logging;
    info!("[{}] Convert endpoint called", request_id);
    if verbose {
        debug!("[{}] Headers: {:?}", request_id, req.headers());
    }

    let upload = match MultipartParser::parse_markdown_upload(payload).await {
        Ok(upload) => upload,
        Err(e) => {
            info!("[{}] Upload rejected: {}", request_id, e);
            return ConvertError::from(e).to_response(verbose);
        }
    };
    info!("[{}] File received: {}", request_id, upload.filename);

    let pipeline = data.pipeline.clone();
    let result = web::block(move || pipeline.convert(upload, request_id))
        .await
        .unwrap_or_else(|e| Err(ConvertError::Internal(e.to_string())));

    match result {
        Ok(artifact) => pdf_response(artifact),
        Err(e) => {
            error!("[{}] Conversion failed: {}", request_id, e);
            e.to_response(verbose)
        }
    }
}

/// Answer CORS preflight and other `OPTIONS` requests with an empty 200.
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/convert")
            .route(web::post().to(convert_markdown))
            .route(web::method(actix_web::http::Method::OPTIONS).to(preflight)),
    );
}
