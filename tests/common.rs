#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web;
use markdown_pdf_server::conversion::{RenderError, RenderJob, Renderer};
use markdown_pdf_server::{AppConfig, AppState};

pub const BOUNDARY: &str = "----markdownpdfserverboundary";

/// Records what each render call saw.
#[derive(Default)]
pub struct RenderLog {
    pub calls: AtomicUsize,
    pub staging_dirs: Mutex<Vec<PathBuf>>,
    pub stylesheets: Mutex<Vec<PathBuf>>,
}

impl RenderLog {
    fn record(&self, job: &RenderJob) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(dir) = job.input.parent() {
            self.staging_dirs.lock().unwrap().push(dir.to_path_buf());
        }
        self.stylesheets.lock().unwrap().push(job.stylesheet.clone());
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn staging_dirs(&self) -> Vec<PathBuf> {
        self.staging_dirs.lock().unwrap().clone()
    }

    pub fn stylesheets(&self) -> Vec<PathBuf> {
        self.stylesheets.lock().unwrap().clone()
    }
}

/// Writes a tiny PDF that embeds the Markdown source, so outputs can be told apart.
#[derive(Default)]
pub struct FakePdfRenderer {
    pub log: RenderLog,
}

impl Renderer for FakePdfRenderer {
    fn render(&self, job: &RenderJob) -> Result<(), RenderError> {
        self.log.record(job);
        let markdown = fs::read(&job.input).map_err(RenderError::ReadInput)?;
        let mut pdf = b"%PDF-1.4\n% ".to_vec();
        pdf.extend_from_slice(&markdown);
        pdf.extend_from_slice(b"\n%%EOF\n");
        fs::write(&job.output, pdf).map_err(|e| RenderError::Other(e.to_string()))
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}

/// Always fails, like a renderer choking on its input.
#[derive(Default)]
pub struct FailingRenderer {
    pub log: RenderLog,
}

impl Renderer for FailingRenderer {
    fn render(&self, job: &RenderJob) -> Result<(), RenderError> {
        self.log.record(job);
        Err(RenderError::Exit {
            code: 1,
            stderr: "simulated renderer failure".to_string(),
        })
    }
}

/// Reports success without producing a file.
#[derive(Default)]
pub struct SilentRenderer {
    pub log: RenderLog,
}

impl Renderer for SilentRenderer {
    fn render(&self, job: &RenderJob) -> Result<(), RenderError> {
        self.log.record(job);
        Ok(())
    }
}

/// Config pointing at an isolated staging root and no shared stylesheet.
pub fn test_config(staging_root: &Path) -> AppConfig {
    AppConfig {
        staging_dir: staging_root.to_path_buf(),
        stylesheet_paths: Vec::new(),
        ..AppConfig::default()
    }
}

pub fn test_state(config: AppConfig, renderer: Arc<dyn Renderer>) -> web::Data<AppState> {
    web::Data::new(AppState::new_with_renderer(config, renderer))
}

/// Multipart body with a single file field.
pub fn multipart_file(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Multipart body with a single text field and no file.
pub fn multipart_text(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub fn dir_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(true)
}
