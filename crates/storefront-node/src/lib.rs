//! # Storefront Node
//!
//! HTTP server for the Storefront product catalog.
//!
//! The node serves a single resource collection, `/products`, backed by an
//! in-memory [`storefront_catalog::Catalog`]. Products are addressed by their
//! current position in the catalog:
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | GET | `/products` | All products |
//! | GET | `/products/{id}` | One product |
//! | POST | `/products` | Append a product |
//! | PUT, PATCH | `/products/{id}` | Merge fields into a product |
//! | DELETE | `/products/{id}` | Remove a product (the last one takes its place) |
//!
//! Any other path answers with a plain-text greeting.
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run --bin storefront-node -- --api-addr 127.0.0.1:8080
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Product routes and request handling
//! - [`config`] - Node configuration
//! - [`observability`] - Structured logging and request tracing

pub mod api;
pub mod config;
pub mod observability;

/// Default API port.
pub const DEFAULT_API_PORT: u16 = 8080;
