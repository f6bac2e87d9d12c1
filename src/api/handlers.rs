//! HTTP API handlers.

use std::fmt;
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::auth::BearerToken;
use super::error::{ApiError, ErrorDetail};
use crate::config::Config;
use crate::system::{sample_blocking, SysinfoProbe, SystemProbe, UnavailableProbe};

/// API version reported by every endpoint.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compiler version the binary was built with.
pub const RUNTIME_VERSION: &str = env!("FULLSTACK_API_RUSTC_VERSION");

/// Application state shared with handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Configuration read at startup.
    pub config: Arc<Config>,
    /// Host utilisation source for `/health/detailed`.
    pub probe: Arc<dyn SystemProbe>,
}

impl AppState {
    /// Create app state with an explicit probe.
    pub fn new(config: Config, probe: Arc<dyn SystemProbe>) -> Self {
        Self {
            config: Arc::new(config),
            probe,
        }
    }

    /// Create app state, picking the probe from `config.system_metrics`.
    pub fn from_config(config: Config) -> Self {
        let probe: Arc<dyn SystemProbe> = if config.system_metrics {
            Arc::new(SysinfoProbe::default())
        } else {
            Arc::new(UnavailableProbe)
        };
        Self::new(config, probe)
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Basic health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok".
    #[schema(example = "ok")]
    pub status: &'static str,
    /// RFC 3339 UTC time of the response.
    pub timestamp: String,
}

/// Detailed health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedHealthResponse {
    /// Always "healthy"; metrics never gate this.
    #[schema(example = "healthy")]
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    /// Rust compiler version of the build.
    pub runtime_version: &'static str,
    /// Operating system, e.g. "linux".
    pub platform: &'static str,
    /// CPU architecture, e.g. "x86_64".
    pub architecture: &'static str,
    pub system: SystemMetrics,
    pub services: ServiceStates,
    pub endpoints: EndpointLinks,
}

/// Host utilisation in percent; zero when unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct SystemMetrics {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// Static service flags.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStates {
    pub api: &'static str,
    pub database: &'static str,
    pub cors: &'static str,
    pub security: &'static str,
}

/// Paths of related endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct EndpointLinks {
    pub health: &'static str,
    pub docs: &'static str,
    pub redoc: &'static str,
    pub status: &'static str,
}

/// API information.
#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub docs: &'static str,
    pub health: &'static str,
    pub detailed_health: &'static str,
    /// The configured frontend origin.
    pub frontend_url: String,
    pub cors_enabled: bool,
    pub security_enabled: bool,
}

/// API status and configuration.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "operational")]
    pub api_status: &'static str,
    #[schema(example = "running")]
    pub uptime: &'static str,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Configured host allow-list.
    pub allowed_hosts: Vec<String>,
    /// Deployment environment label.
    pub environment: String,
    pub timestamp: String,
}

/// Protected data.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProtectedResponse {
    pub message: &'static str,
    #[schema(example = "authenticated_user")]
    pub user: &'static str,
    pub timestamp: String,
}

/// Basic Health Check
///
/// Always 200 while the process is up.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: timestamp(),
    })
}

/// Detailed Health Check
///
/// Health status with build and host information. CPU, memory and disk
/// figures fall back to zero when they cannot be sampled.
#[utoipa::path(
    get,
    path = "/health/detailed",
    tag = "Health",
    responses(
        (status = 200, description = "Comprehensive health status", body = DetailedHealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let system = match sample_blocking(state.probe.clone()).await {
        Some(usage) => SystemMetrics {
            cpu_percent: usage.cpu_percent,
            memory_percent: usage.memory_percent,
            disk_percent: usage.disk_percent.unwrap_or_else(|| {
                debug!("Disk usage unavailable, reporting 0");
                0.0
            }),
        },
        None => {
            debug!("System metrics unavailable, reporting zeros");
            SystemMetrics::default()
        }
    };

    Json(DetailedHealthResponse {
        status: "healthy",
        timestamp: timestamp(),
        version: API_VERSION,
        runtime_version: RUNTIME_VERSION,
        platform: std::env::consts::OS,
        architecture: std::env::consts::ARCH,
        system,
        services: ServiceStates {
            api: "running",
            database: "available",
            cors: "configured",
            security: "enabled",
        },
        endpoints: EndpointLinks {
            health: "/health",
            docs: "/docs",
            redoc: "/redoc",
            status: "/api/status",
        },
    })
}

/// API Information
///
/// Welcome message and links to the main endpoints.
#[utoipa::path(
    get,
    path = "/",
    tag = "Meta",
    responses(
        (status = 200, description = "API metadata", body = RootResponse)
    )
)]
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "🚀 Full-Stack API",
        version: API_VERSION,
        docs: "/docs",
        health: "/health",
        detailed_health: "/health/detailed",
        frontend_url: state.config.frontend_origin.clone(),
        cors_enabled: true,
        security_enabled: true,
    })
}

/// API Status
///
/// Current API status and configuration.
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Meta",
    responses(
        (status = 200, description = "API status information", body = StatusResponse)
    )
)]
pub async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        api_status: "operational",
        uptime: "running",
        cors_origins: vec![state.config.frontend_origin.clone()],
        allowed_hosts: state.config.allowed_hosts.clone(),
        environment: state.config.environment.clone(),
        timestamp: timestamp(),
    })
}

/// Protected Endpoint
///
/// Example endpoint requiring a bearer token. Only the token's presence is
/// checked.
#[utoipa::path(
    get,
    path = "/api/protected",
    tag = "Protected",
    security(("HTTPBearer" = [])),
    responses(
        (status = 200, description = "Protected data", body = ProtectedResponse),
        (status = 401, description = "Missing or empty bearer token", body = ErrorDetail)
    )
)]
pub async fn protected(token: BearerToken) -> Result<Json<ProtectedResponse>, ApiError> {
    if token.token().is_empty() {
        return Err(ApiError::Unauthorized("Authentication required"));
    }

    Ok(Json(ProtectedResponse {
        message: "This is a protected endpoint",
        user: "authenticated_user",
        timestamp: timestamp(),
    }))
}
