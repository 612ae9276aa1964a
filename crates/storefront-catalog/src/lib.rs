//! Product records and the in-memory catalog for Storefront.
//!
//! Products have no identity field. A product is addressed by its current
//! position in the catalog, and positions are reused when a product is
//! removed (see [`ProductList::remove`]).

mod error;
mod product;
mod store;

pub use error::CatalogError;
pub use product::Product;
pub use store::{Catalog, ProductId, ProductList};

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
