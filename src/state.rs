use std::sync::Arc;

use crate::config::AppConfig;
use crate::conversion::{ConversionPipeline, HtmlCommandRenderer, Renderer, StagingStore, StylesheetResolver};

/// Shared, read-only application state. Requests never mutate it.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: Arc<ConversionPipeline>,
}

impl AppState {
    /// State with the command-line renderer described by `config`.
    pub fn new(config: AppConfig) -> Self {
        let renderer = Arc::new(HtmlCommandRenderer::new(
            config.renderer_command.clone(),
            config.renderer_args.clone(),
        ));
        Self::new_with_renderer(config, renderer)
    }

    pub fn new_with_renderer(config: AppConfig, renderer: Arc<dyn Renderer>) -> Self {
        let staging = StagingStore::new(config.staging_dir.clone());
        let stylesheets = StylesheetResolver::new(config.stylesheet_paths.clone()).verbose(config.verbose_logging);
        let pipeline = Arc::new(ConversionPipeline::new(staging, stylesheets, renderer));

        Self { config, pipeline }
    }
}
