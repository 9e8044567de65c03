use super::cart::CartLine;
use super::order::OneClickOrder;
use super::payment::PaymentLookup;
use super::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for the persisted cart snapshot.
///
/// The snapshot is always written whole (last-write-wins), so a concurrent
/// writer can at worst overwrite, never corrupt partially.
#[async_trait]
pub trait CartSnapshotStore: Send + Sync {
    /// Returns the saved lines, or `None` when no snapshot exists yet.
    /// Corrupt data is an error; the cart store recovers from it by
    /// starting empty.
    async fn load(&self) -> Result<Option<Vec<CartLine>>>;
    async fn save(&self, lines: &[CartLine]) -> Result<()>;
}

/// Read access to product reference data held by the backend.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn product(&self, product_id: &str) -> Result<Option<Product>>;
}

/// Creates pending purchase intents on the backend.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Returns the opaque order identifier on success.
    async fn submit_one_click(&self, order: &OneClickOrder) -> Result<String>;
}

/// Observes the backend-held payment record for an order.
#[async_trait]
pub trait PaymentStatusSource: Send + Sync {
    async fn fetch(&self, order_id: &str) -> Result<PaymentLookup>;
}

pub type SnapshotStoreArc = Arc<dyn CartSnapshotStore>;
pub type ProductCatalogArc = Arc<dyn ProductCatalog>;
pub type OrderGatewayArc = Arc<dyn OrderGateway>;
pub type PaymentSourceArc = Arc<dyn PaymentStatusSource>;
