//! Runtime configuration loaded from the environment.
//!
//! Everything the conversion endpoint needs to know about its surroundings
//! (bind address, path prefix, staging root, stylesheet search order, renderer
//! command, logging and CORS toggles) lives in [`AppConfig`] and is passed down
//! explicitly at startup.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// How cross-origin requests are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Every response carries `Access-Control-Allow-Origin: *`.
    Wildcard,
    /// The caller's origin is reflected back (actix-cors permissive mode).
    Reflect,
}

impl CorsPolicy {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wildcard" | "*" => Ok(Self::Wildcard),
            "reflect" | "permissive" => Ok(Self::Reflect),
            _ => Err(ConfigError::InvalidValue {
                key: "CORS_POLICY",
                value: value.to_string(),
                reason: "expected 'wildcard' or 'reflect'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Path prefix for every endpoint, either empty or `/segment[/segment...]`.
    pub base_path: String,
    pub staging_dir: PathBuf,
    /// Ordered stylesheet candidates, first existing one wins.
    pub stylesheet_paths: Vec<PathBuf>,
    pub renderer_command: String,
    pub renderer_args: Vec<String>,
    pub verbose_logging: bool,
    pub cors_policy: CorsPolicy,
}

/// Candidate stylesheet locations searched when `STYLESHEET_PATHS` is unset.
pub fn default_stylesheet_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/public/css/pdf-style.css")),
        PathBuf::from("./public/css/pdf-style.css"),
        PathBuf::from("../public/css/pdf-style.css"),
        PathBuf::from("/tmp/pdf-style.css"),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            base_path: "/api".to_string(),
            staging_dir: std::env::temp_dir(),
            stylesheet_paths: default_stylesheet_paths(),
            renderer_command: "wkhtmltopdf".to_string(),
            renderer_args: vec!["--quiet".to_string()],
            verbose_logging: false,
            cors_policy: CorsPolicy::Wildcard,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    /// for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "PORT",
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(base_path) = lookup("BASE_PATH") {
            config.base_path = normalize_base_path(&base_path);
        }
        if let Some(dir) = lookup("STAGING_DIR").filter(|d| !d.trim().is_empty()) {
            config.staging_dir = PathBuf::from(dir);
        }
        if let Some(paths) = lookup("STYLESHEET_PATHS") {
            config.stylesheet_paths = paths
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        if let Some(command) = lookup("RENDERER_COMMAND").filter(|c| !c.trim().is_empty()) {
            config.renderer_command = command;
        }
        if let Some(args) = lookup("RENDERER_ARGS") {
            config.renderer_args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(verbose) = lookup("VERBOSE_LOGGING") {
            config.verbose_logging = parse_bool("VERBOSE_LOGGING", &verbose)?;
        }
        if let Some(policy) = lookup("CORS_POLICY") {
            config.cors_policy = CorsPolicy::parse(&policy)?;
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    /// Default `env_logger` filter for this configuration.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose_logging {
            "debug"
        } else {
            "info"
        }
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
