//! Error types for catalog operations.

use thiserror::Error;

use crate::ProductId;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No product currently occupies the given position.
    #[error("product not found: {id}")]
    NotFound { id: ProductId },
}
