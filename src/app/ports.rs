use crate::domain::{Customer, Order, OrderDetail, Product};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Reads one entity set per call from an opaque source location. Fails with
/// an I/O or parse error when the source cannot be read against the expected
/// field mapping.
#[async_trait]
pub trait DataExtractor: Send + Sync {
    async fn extract_customers(&self, source: &Path) -> Result<Vec<Customer>>;
    async fn extract_products(&self, source: &Path) -> Result<Vec<Product>>;
    async fn extract_orders(&self, source: &Path) -> Result<Vec<Order>>;
    async fn extract_order_details(&self, source: &Path) -> Result<Vec<OrderDetail>>;
}

/// Writes entity sets to the destination store.
///
/// `clear_all` and `validate_foreign_keys` are first-class parts of the
/// contract: every loader must be able to empty the target before a run and
/// check referential integrity after it.
#[async_trait]
pub trait DataLoader: Send + Sync {
    /// Empties all four destination tables. A partially cleared target is not
    /// an acceptable state to load into, so failure here is fatal.
    async fn clear_all(&self) -> Result<()>;

    async fn load_customers(&self, customers: &[Customer]) -> Result<()>;
    async fn load_products(&self, products: &[Product]) -> Result<()>;
    async fn load_orders(&self, orders: &[Order]) -> Result<()>;
    async fn load_order_details(&self, order_details: &[OrderDetail]) -> Result<()>;

    /// Post-load check: true iff every loaded order references an existing
    /// customer row.
    async fn validate_foreign_keys(&self) -> Result<bool>;
}
