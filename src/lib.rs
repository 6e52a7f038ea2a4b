use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{header, Method};
use actix_web::middleware::{Condition, DefaultHeaders, Logger};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::openapi::server::Server;
use utoipa::{OpenApi, ToSchema};

pub mod config;
pub mod conversion;
pub mod state;
pub mod status;

pub use crate::config::{AppConfig, CorsPolicy};
pub use crate::state::AppState;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "No markdown file uploaded")]
    pub error: String,
    /// Underlying cause, only present when verbose logging is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(&format!("Route {} not found", path))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::conversion::handlers::convert_markdown,
        crate::status::handlers::service_info,
        crate::status::handlers::ping,
        crate::status::handlers::debug_report,
    ),
    components(
        schemas(
            ErrorResponse,
            conversion::handlers::ConvertRequest,
            status::models::ServiceInfo,
            status::models::ServiceEnvironment,
            status::models::PingResponse,
            status::models::DebugReport,
            status::models::PlatformInfo,
            status::models::FsProbe,
        )
    ),
    tags(
        (name = "Conversion", description = "Markdown to PDF conversion."),
        (name = "Status", description = "Liveness and diagnostics.")
    )
)]
pub struct ApiDoc;

async fn openapi_json(data: web::Data<AppState>) -> HttpResponse {
    let mut doc = ApiDoc::openapi();
    let base = if data.config.base_path.is_empty() {
        "/".to_string()
    } else {
        data.config.base_path.clone()
    };
    doc.servers = Some(vec![Server::new(base)]);
    HttpResponse::Ok().json(doc)
}

/// Empty 200 for any `OPTIONS`, JSON 404 for everything else.
async fn fallback(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::NotFound().json(ErrorResponse::not_found(req.path()))
    }
}

fn wildcard_cors() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Origin, X-Requested-With, Content-Type, Accept, Content-Disposition",
        ))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .add((header::ACCESS_CONTROL_MAX_AGE, "86400"))
}

/// Build the application with all routes and middleware except metrics.
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = state.config.clone();
    let wildcard = config.cors_policy == CorsPolicy::Wildcard;

    App::new()
        .app_data(state)
        .wrap(Condition::new(config.verbose_logging, Logger::default()))
        .wrap(Condition::new(!wildcard, Cors::permissive()))
        .wrap(Condition::new(wildcard, wildcard_cors()))
        .route("/api-doc/openapi.json", web::get().to(openapi_json))
        .service(
            web::scope(&config.base_path)
                .configure(status::config)
                .configure(conversion::handlers::config),
        )
        .default_service(web::to(fallback))
}

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter())).init();

    std::fs::create_dir_all(&config.staging_dir)
        .with_context(|| format!("failed to create staging directory {:?}", config.staging_dir))?;

    let prometheus = PrometheusMetricsBuilder::new("markdown_pdf_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    let bind = config.bind_address();
    log::info!(
        "Starting server at http://{}:{}{} (staging in {:?}, CORS {:?})",
        bind.0,
        bind.1,
        config.base_path,
        config.staging_dir,
        config.cors_policy
    );

    let app_state = web::Data::new(AppState::new(config));

    HttpServer::new(move || create_app(app_state.clone()).wrap(prometheus.clone()))
        .keep_alive(actix_web::http::KeepAlive::Os)
        .bind(bind)?
        .run()
        .await?;

    Ok(())
}
