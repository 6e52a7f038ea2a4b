use actix_web::{web, HttpResponse, Responder};
use log::{info, warn};

use super::models::{DebugReport, FsProbe, PingResponse, PlatformInfo, ServiceEnvironment, ServiceInfo};
use crate::conversion::handlers::preflight;
use crate::conversion::StagingStore;
use crate::state::AppState;

const PROBE_FILE: &str = "probe.txt";
const PROBE_CONTENT: &str = "Hello World";

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[utoipa::path(
    tag = "Status",
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    )
)]
pub async fn service_info(data: web::Data<AppState>) -> impl Responder {
    info!("Status endpoint called");
    HttpResponse::Ok().json(ServiceInfo {
        message: "Markdown to PDF Converter API is running".to_string(),
        environment: ServiceEnvironment {
            temp_dir: std::env::temp_dir().display().to_string(),
            staging_dir: data.pipeline.staging().root().display().to_string(),
            base_path: data.config.base_path.clone(),
            renderer: data.pipeline.renderer().describe(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        timestamp: now(),
    })
}

#[utoipa::path(
    tag = "Status",
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Liveness check", body = PingResponse)
    )
)]
pub async fn ping() -> impl Responder {
    HttpResponse::Ok().json(PingResponse {
        status: "ok".to_string(),
        timestamp: now(),
    })
}

#[utoipa::path(
    tag = "Status",
    get,
    path = "/debug",
    responses(
        (status = 200, description = "Environment and staging filesystem diagnostics", body = DebugReport)
    )
)]
pub async fn debug_report(data: web::Data<AppState>) -> impl Responder {
    let store = data.pipeline.staging().clone();
    let fs_tests = web::block(move || probe_staging(&store))
        .await
        .unwrap_or_else(|e| FsProbe {
            error: Some(e.to_string()),
            ..FsProbe::default()
        });

    HttpResponse::Ok().json(DebugReport {
        status: "ok".to_string(),
        timestamp: now(),
        environment: PlatformInfo {
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            temp_dir: std::env::temp_dir().display().to_string(),
            staging_dir: data.pipeline.staging().root().display().to_string(),
        },
        fs_tests,
    })
}

/// Allocate a staging location, write and read a file, then release it.
pub fn probe_staging(store: &StagingStore) -> FsProbe {
    let mut probe = FsProbe::default();

    let location = match store.allocate() {
        Ok(location) => location,
        Err(e) => {
            warn!("Staging probe failed: {}", e);
            probe.error = Some(e.to_string());
            return probe;
        }
    };
    probe.dir_created = location.path().is_dir();

    match location.write_file(PROBE_FILE, PROBE_CONTENT.as_bytes()) {
        Ok(path) => {
            probe.file_written = path.is_file();
            match std::fs::read_to_string(&path) {
                Ok(content) => probe.file_content = Some(content),
                Err(e) => probe.error = Some(e.to_string()),
            }
        }
        Err(e) => probe.error = Some(e.to_string()),
    }

    location.release();
    probe
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(service_info))
            .route(web::method(actix_web::http::Method::OPTIONS).to(preflight)),
    )
    .service(
        web::resource("/ping")
            .route(web::get().to(ping))
            .route(web::method(actix_web::http::Method::OPTIONS).to(preflight)),
    )
    .service(
        web::resource("/debug")
            .route(web::get().to(debug_report))
            .route(web::method(actix_web::http::Method::OPTIONS).to(preflight)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_round_trip() {
        let root = tempfile::tempdir().unwrap();
        let probe = probe_staging(&StagingStore::new(root.path()));

        assert!(probe.dir_created);
        assert!(probe.file_written);
        assert_eq!(probe.file_content.as_deref(), Some(PROBE_CONTENT));
        assert!(probe.error.is_none());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_probe_reports_allocation_failure() {
        let root = tempfile::tempdir().unwrap();
        let probe = probe_staging(&StagingStore::new(root.path().join("missing")));

        assert!(!probe.dir_created);
        assert!(probe.error.is_some());
    }
}
