//! HTTP API: routes, handlers, middleware and generated docs.

pub mod auth;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::create_router;
