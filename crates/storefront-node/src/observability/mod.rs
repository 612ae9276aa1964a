//! # Observability Module
//!
//! Logging and request tracing for the Storefront node:
//!
//! - **Structured Logging**: pretty or JSON output, filtered by `RUST_LOG`
//! - **Request Tracing**: a request ID attached to every request span
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{middleware, Router};
//! use storefront_node::observability::{init_logging, request_id_middleware, LogFormat};
//!
//! init_logging("info", LogFormat::Json);
//!
//! let app: Router<()> = Router::new()
//!     .layer(middleware::from_fn(request_id_middleware));
//! ```

mod logging;
pub mod middleware;

pub use logging::{init_logging, LogFormat};
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
