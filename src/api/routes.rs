//! HTTP API route definitions and middleware stack.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    response::Html,
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;

use super::docs::{swagger_ui_router, ApiDoc, ReDoc, OPENAPI_PATH, REDOC_PATH};
use super::error::ApiError;
use super::handlers::{api_status, health, health_detailed, protected, root, AppState};
use super::middleware::{
    client_error_body_middleware, handle_panic, trusted_host_middleware, TrustedHosts,
};
use crate::config::Config;

/// Create the API router: [`api_routes`] with `state`, under [`with_middleware`].
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    with_middleware(api_routes().with_state(state), &config)
}

/// Route table, documentation and 404 fallback, without middleware.
pub fn api_routes() -> Router<AppState> {
    let openapi = ApiDoc::openapi();
    let redoc = ReDoc::new(openapi.info.title.clone(), OPENAPI_PATH).html();

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/health/detailed", get(health_detailed))
        // Meta endpoints
        .route("/", get(root))
        .route("/api/status", get(api_status))
        // Protected endpoints
        .route("/api/protected", get(protected))
        // Documentation
        .route(
            REDOC_PATH,
            get(move || {
                let page = redoc.clone();
                async move { Html(page) }
            }),
        )
        .merge(swagger_ui_router(openapi))
        .fallback(not_found)
}

/// Wrap a router in the service middleware.
///
/// Layers, outermost first: trusted-host filter, CORS, request tracing,
/// client-error bodies, panic capture.
pub fn with_middleware(router: Router, config: &Config) -> Router {
    let trusted = Arc::new(TrustedHosts::new(config.trusted_hosts()));

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(client_error_body_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .layer(middleware::from_fn_with_state(
            trusted,
            trusted_host_middleware,
        ))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// CORS policy: the single frontend origin, with credentials.
fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config
        .cors_origin()
        .and_then(|o| HeaderValue::from_str(&o).ok())
    {
        Some(value) => AllowOrigin::list([value]),
        None => {
            warn!(origin = %config.frontend_origin, "Frontend origin unusable for CORS, denying all origins");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::UnavailableProbe;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(Config::default(), Arc::new(UnavailableProbe)))
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::HOST, "localhost:8000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn untrusted_host_is_rejected_before_routing() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::HOST, "attacker.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn redoc_page_is_html() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/redoc")
                    .header(header::HOST, "localhost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }
}
