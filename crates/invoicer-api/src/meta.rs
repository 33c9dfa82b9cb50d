use axum::{Json, response::IntoResponse};

use invoicer_types::version::VersionInfo;

use crate::error::ApiError;

/// GET /__heartbeat__
pub async fn heartbeat() -> &'static str {
    "I am alive"
}

/// GET /__version__ — build metadata. `INVOICER_COMMIT` and
/// `INVOICER_BUILD_URL` are read at compile time.
pub async fn version() -> impl IntoResponse {
    Json(VersionInfo {
        source: env!("CARGO_PKG_REPOSITORY").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: option_env!("INVOICER_COMMIT").unwrap_or("unknown").to_string(),
        build: option_env!("INVOICER_BUILD_URL").unwrap_or("unknown").to_string(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
