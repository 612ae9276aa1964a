//! In-memory storage for products.

use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;

use crate::{CatalogError, Product, Result};

/// Externally visible product identifier: the product's current position.
///
/// Signed so that negative identifiers from a request path can be carried
/// through and rejected as not found.
pub type ProductId = i64;

/// Ordered collection of products.
///
/// Positions always form the contiguous range `0..len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProductList {
    products: Vec<Product>,
}

impl ProductList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the list every fresh server starts with.
    pub fn seeded() -> Self {
        Self::from(vec![
            Product::new("Shoes", 25.0),
            Product::new("Webcam", 50.0),
            Product::new("Mic", 20.0),
        ])
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the list holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Iterates over products in position order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    fn position(&self, id: ProductId) -> Result<usize> {
        usize::try_from(id)
            .ok()
            .filter(|&index| index < self.products.len())
            .ok_or(CatalogError::NotFound { id })
    }

    /// Gets the product at `id`.
    pub fn get(&self, id: ProductId) -> Result<&Product> {
        let index = self.position(id)?;
        Ok(&self.products[index])
    }

    /// Appends a product and returns its id.
    pub fn push(&mut self, product: Product) -> ProductId {
        self.products.push(product);
        ProductId::try_from(self.products.len() - 1).unwrap_or(ProductId::MAX)
    }

    /// Merges `patch` into the product at `id` and returns the result.
    ///
    /// See [`Product::merge`] for which fields are applied.
    pub fn merge(&mut self, id: ProductId, patch: Product) -> Result<&Product> {
        let index = self.position(id)?;
        let product = &mut self.products[index];
        product.merge(patch);
        Ok(product)
    }

    /// Removes the product at `id`.
    ///
    /// The last product moves into the vacated position, so the id that
    /// previously addressed the last product becomes invalid.
    pub fn remove(&mut self, id: ProductId) -> Result<Product> {
        let index = self.position(id)?;
        Ok(self.products.swap_remove(index))
    }
}

impl From<Vec<Product>> for ProductList {
    fn from(products: Vec<Product>) -> Self {
        Self { products }
    }
}

/// Shared product catalog.
///
/// All access goes through a single exclusive lock; readers and writers
/// are not distinguished.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Mutex<ProductList>,
}

impl Catalog {
    /// Creates a catalog holding `products`.
    pub fn new(products: ProductList) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }

    /// Creates a catalog holding the seed products.
    pub fn seeded() -> Self {
        Self::new(ProductList::seeded())
    }

    /// Acquires the catalog lock.
    ///
    /// The lock is released when the returned guard is dropped.
    pub fn lock(&self) -> MutexGuard<'_, ProductList> {
        self.products.lock()
    }

    /// Number of products at the time of the call.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the catalog was empty at the time of the call.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies out the current products.
    pub fn snapshot(&self) -> ProductList {
        self.lock().clone()
    }
}
