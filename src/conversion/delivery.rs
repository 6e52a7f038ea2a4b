//! Building the PDF attachment response.

use std::path::Path;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::HttpResponse;
use sanitize_filename::sanitize;

use super::pipeline::RenderedArtifact;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const FALLBACK_STEM: &str = "document";

/// `<stem>.pdf` for the uploaded filename, e.g. `notes.md` -> `notes.pdf`.
///
/// Characters not allowed in filenames are dropped from the stem, so
/// `a:b.md` becomes `ab.pdf`.
pub fn attachment_filename(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(sanitize)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    format!("{stem}.pdf")
}

/// 200 response carrying the PDF as an attachment.
pub fn pdf_response(artifact: RenderedArtifact) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(PDF_CONTENT_TYPE)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(artifact.filename)],
        })
        .body(artifact.bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::{header, StatusCode};

    #[test]
    fn test_attachment_filename_replaces_extension() {
        assert_eq!(attachment_filename("notes.md"), "notes.pdf");
        assert_eq!(attachment_filename("release.notes.md"), "release.notes.pdf");
        assert_eq!(attachment_filename("README"), "README.pdf");
    }

    #[test]
    fn test_attachment_filename_strips_directories() {
        assert_eq!(attachment_filename("../../etc/passwd.md"), "passwd.pdf");
        assert_eq!(attachment_filename("docs/guide.md"), "guide.pdf");
    }

    #[test]
    fn test_attachment_filename_drops_reserved_characters() {
        assert_eq!(attachment_filename("a:b.md"), "ab.pdf");
        assert_eq!(attachment_filename("report<v2>.md"), "reportv2.pdf");
        assert_eq!(attachment_filename("what?.md"), "what.pdf");
    }

    #[test]
    fn test_attachment_filename_fallback() {
        assert_eq!(attachment_filename(""), "document.pdf");
        assert_eq!(attachment_filename("/"), "document.pdf");
    }

    #[actix_web::test]
    async fn test_pdf_response_headers() {
        let response = pdf_response(RenderedArtifact {
            bytes: b"%PDF-1.4 test".to_vec(),
            filename: "notes.pdf".to_string(),
        });

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"notes.pdf\""
        );

        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], b"%PDF-1.4 test");
    }
}
