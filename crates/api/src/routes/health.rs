//! Health check and service info endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Service banner.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Chat Platform API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
