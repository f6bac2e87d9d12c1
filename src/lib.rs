//! Full-stack application API.
//!
//! A small axum service exposing health, status and API information
//! endpoints plus one bearer-protected example route, behind a trusted-host
//! filter and a single-origin CORS policy. OpenAPI, Swagger UI and ReDoc are
//! generated from the handler annotations.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Startup error types
//! - [`api`]: HTTP routes, middleware and docs
//! - [`system`]: Host CPU/memory/disk sampling
//! - [`shutdown`]: Shutdown signal handling

pub mod api;
pub mod config;
pub mod error;
pub mod shutdown;
pub mod system;

pub use config::Config;
pub use error::{AppError, Result};
