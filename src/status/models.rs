use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceEnvironment {
    pub temp_dir: String,
    pub staging_dir: String,
    pub base_path: String,
    pub renderer: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    #[schema(example = "Markdown to PDF Converter API is running")]
    pub message: String,
    pub environment: ServiceEnvironment,
    #[schema(example = "2025-11-05T08:00:00+00:00")]
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlatformInfo {
    pub platform: String,
    pub arch: String,
    pub temp_dir: String,
    pub staging_dir: String,
}

/// Result of the staging round trip run by the debug endpoint.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct FsProbe {
    pub dir_created: bool,
    pub file_written: bool,
    pub file_content: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DebugReport {
    pub status: String,
    pub timestamp: String,
    pub environment: PlatformInfo,
    pub fs_tests: FsProbe,
}
