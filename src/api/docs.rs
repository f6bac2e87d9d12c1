//! Generated API documentation: OpenAPI document and ReDoc page.
//!
//! Swagger UI assets come from `utoipa-swagger-ui`; ReDoc is a static page
//! that loads the bundle from a CDN. Both read the same `/openapi.json`.

use std::sync::Arc;

use axum::{
    extract::Path,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::Config as SwaggerConfig;

use super::auth::BEARER_SCHEME;
use super::error::{ApiError, ErrorDetail, InternalErrorBody};
use super::handlers;

/// Path of the Swagger UI.
pub const DOCS_PATH: &str = "/docs";
/// Path of the ReDoc page.
pub const REDOC_PATH: &str = "/redoc";
/// Path of the OpenAPI document.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// OpenAPI document built from the handler annotations.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Full-Stack API",
        version = "1.0.0",
        description = "🚀 **Full-Stack Application API**

A secure, production-ready API backend with:

* **CORS Configuration** - Properly configured for frontend communication
* **Security Headers** - Trusted-host filtering for additional security
* **Health Monitoring** - Comprehensive health check endpoints
* **Auto Documentation** - Interactive API docs with OpenAPI
* **Error Handling** - Structured error responses

## Authentication

This API uses Bearer token authentication for protected endpoints.

## Rate Limiting

API calls are rate-limited to prevent abuse.",
        contact(name = "API Support", email = "support@example.com"),
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::health,
        handlers::health_detailed,
        handlers::root,
        handlers::api_status,
        handlers::protected,
    ),
    components(schemas(ErrorDetail, InternalErrorBody)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and diagnostics"),
        (name = "Meta", description = "API information and status"),
        (name = "Protected", description = "Endpoints requiring a bearer token")
    )
)]
pub struct ApiDoc;

/// Registers the HTTP bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// Swagger UI under [`DOCS_PATH`] plus the OpenAPI document under
/// [`OPENAPI_PATH`].
///
/// The index is answered at `/docs` itself as well as `/docs/`; a `<base>`
/// tag keeps the UI's relative asset links under `/docs/`.
pub fn swagger_ui_router<S>(openapi: utoipa::openapi::OpenApi) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let config = Arc::new(SwaggerConfig::new([OPENAPI_PATH]));
    let index_config = config.clone();
    let asset_config = config;
    let openapi = Arc::new(openapi);

    let index = get(move || {
        let config = index_config.clone();
        async move { swagger_file("", config) }
    });

    Router::new()
        .route(
            OPENAPI_PATH,
            get(move || {
                let doc = openapi.clone();
                async move { Json(doc.as_ref().clone()) }
            }),
        )
        .route(DOCS_PATH, index.clone())
        .route(&format!("{DOCS_PATH}/"), index)
        .route(
            &format!("{DOCS_PATH}/*tail"),
            get(move |Path(tail): Path<String>| {
                let config = asset_config.clone();
                async move { swagger_file(&tail, config) }
            }),
        )
}

fn swagger_file(tail: &str, config: Arc<SwaggerConfig<'static>>) -> Response {
    let is_index = tail.is_empty() || tail == "index.html";

    match utoipa_swagger_ui::serve(tail, config) {
        Ok(Some(file)) => {
            let body = if is_index {
                with_base_href(&String::from_utf8_lossy(&file.bytes)).into_bytes()
            } else {
                file.bytes.into_owned()
            };
            ([(header::CONTENT_TYPE, file.content_type)], body).into_response()
        }
        Ok(None) => ApiError::NotFound.into_response(),
        Err(e) => ApiError::Internal(format!("swagger ui: {}", e)).into_response(),
    }
}

fn with_base_href(index: &str) -> String {
    index.replacen("<head>", &format!("<head>\n    <base href=\"{DOCS_PATH}/\">"), 1)
}

/// ReDoc page configuration.
#[derive(Debug, Clone)]
pub struct ReDoc {
    title: String,
    spec_url: String,
    redoc_version: String,
}

impl ReDoc {
    /// Page for the given API title reading the spec from `spec_url`.
    pub fn new(title: impl Into<String>, spec_url: impl Into<String>) -> Self {
        Self {
            title: format!("{} - ReDoc", title.into()),
            spec_url: spec_url.into(),
            redoc_version: "2.1.5".to_string(),
        }
    }

    /// Render the HTML page.
    pub fn html(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link href="https://fonts.googleapis.com/css?family=Montserrat:300,400,700|Roboto:300,400,700" rel="stylesheet">
    <style>body {{ margin: 0; padding: 0; }}</style>
  </head>
  <body>
    <noscript>ReDoc requires Javascript to function. Please enable it to browse the documentation.</noscript>
    <redoc spec-url="{spec_url}"></redoc>
    <script src="https://cdn.jsdelivr.net/npm/redoc@{version}/bundles/redoc.standalone.js"></script>
  </body>
</html>
"#,
            title = escape_html(&self.title),
            spec_url = escape_html(&self.spec_url),
            version = self.redoc_version,
        )
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in ["/", "/health", "/health/detailed", "/api/status", "/api/protected"] {
            assert!(paths.contains(&path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }

    #[test]
    fn redoc_page_points_at_openapi_document() {
        let html = ReDoc::new("Full-Stack API", OPENAPI_PATH).html();
        assert!(html.contains("<redoc spec-url=\"/openapi.json\">"));
        assert!(html.contains("<title>Full-Stack API - ReDoc</title>"));
    }

    #[test]
    fn swagger_index_is_rebased_under_docs() {
        let page = with_base_href("<html>\n  <head>\n    <title>Swagger UI</title>");
        assert!(page.contains("<head>\n    <base href=\"/docs/\">"));
    }

    #[test]
    fn escapes_markup_in_title() {
        assert_eq!(escape_html("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
