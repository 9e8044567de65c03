use crate::domain::cart::{Cart, CartLine, VariantSelector};
use crate::domain::ports::SnapshotStoreArc;
use crate::error::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The authoritative client-side view of what the customer intends to buy.
///
/// Every mutation recomputes the derived totals and writes the full
/// snapshot through to the configured store. Cloning yields a shared
/// handle to the same cart.
#[derive(Clone)]
pub struct CartStore {
    cart: Arc<RwLock<Cart>>,
    snapshots: SnapshotStoreArc,
}

impl CartStore {
    /// Loads the persisted snapshot. An unreadable or corrupt snapshot is
    /// treated as "no saved cart": the store starts empty and the failure
    /// is logged, never surfaced to the user.
    pub async fn load(snapshots: SnapshotStoreArc) -> Self {
        let cart = match snapshots.load().await {
            Ok(Some(lines)) => Cart::from_lines(lines),
            Ok(None) => Cart::default(),
            Err(err) => {
                tracing::warn!(error = %err, "cart snapshot unreadable, starting empty");
                Cart::default()
            }
        };
        Self {
            cart: Arc::new(RwLock::new(cart)),
            snapshots,
        }
    }

    pub async fn add_item(&self, line: CartLine) -> Result<()> {
        let mut cart = self.cart.write().await;
        cart.add(line);
        self.snapshots.save(cart.lines()).await
    }

    pub async fn remove_item(&self, product_id: &str, selector: &VariantSelector) -> Result<()> {
        let mut cart = self.cart.write().await;
        if cart.remove(product_id, selector) == 0 {
            return Ok(());
        }
        self.snapshots.save(cart.lines()).await
    }

    /// Quantities below 1 are a no-op, guarding against accidental
    /// deletion via decrement.
    pub async fn update_quantity(
        &self,
        product_id: &str,
        quantity: u32,
        selector: &VariantSelector,
    ) -> Result<()> {
        let mut cart = self.cart.write().await;
        if !cart.set_quantity(product_id, quantity, selector) {
            return Ok(());
        }
        self.snapshots.save(cart.lines()).await
    }

    pub async fn clear(&self) -> Result<()> {
        let mut cart = self.cart.write().await;
        cart.clear();
        self.snapshots.save(cart.lines()).await
    }

    pub async fn lines(&self) -> Vec<CartLine> {
        self.cart.read().await.lines().to_vec()
    }

    pub async fn total(&self) -> Decimal {
        self.cart.read().await.total()
    }

    pub async fn total_items(&self) -> u64 {
        self.cart.read().await.total_items()
    }

    pub async fn is_empty(&self) -> bool {
        self.cart.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::CartSnapshotStore;
    use crate::error::CheckoutError;
    use crate::infrastructure::in_memory::InMemorySnapshotStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct CorruptSnapshotStore;

    #[async_trait]
    impl CartSnapshotStore for CorruptSnapshotStore {
        async fn load(&self) -> Result<Option<Vec<CartLine>>> {
            let bad: std::result::Result<Vec<CartLine>, _> = serde_json::from_str("not json");
            Err(CheckoutError::Snapshot(bad.unwrap_err()))
        }

        async fn save(&self, _lines: &[CartLine]) -> Result<()> {
            Ok(())
        }
    }

    fn line(product_id: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            variant_id: None,
            size_label: None,
            name: product_id.to_string(),
            unit_price: dec!(10),
            quantity,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_mutations_write_through() {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let store = CartStore::load(snapshots.clone()).await;

        store.add_item(line("A", 2)).await.unwrap();
        let saved = snapshots.load().await.unwrap().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].quantity, 2);

        store
            .update_quantity("A", 5, &VariantSelector::default())
            .await
            .unwrap();
        let saved = snapshots.load().await.unwrap().unwrap();
        assert_eq!(saved[0].quantity, 5);

        store.clear().await.unwrap();
        let saved = snapshots.load().await.unwrap().unwrap();
        assert!(saved.is_empty());
    }

    #[tokio::test]
    async fn test_survives_restart() {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        {
            let store = CartStore::load(snapshots.clone()).await;
            store.add_item(line("A", 3)).await.unwrap();
        }

        let restored = CartStore::load(snapshots).await;
        assert_eq!(restored.total_items().await, 3);
        assert_eq!(restored.total().await, dec!(30));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_recovers_to_empty() {
        let store = CartStore::load(Arc::new(CorruptSnapshotStore)).await;
        assert!(store.is_empty().await);
        assert_eq!(store.total().await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_totals_follow_operations() {
        let store = CartStore::load(Arc::new(InMemorySnapshotStore::new())).await;
        store.add_item(line("A", 2)).await.unwrap();
        store.add_item(line("B", 1)).await.unwrap();
        assert_eq!(store.total().await, dec!(30));
        assert_eq!(store.total_items().await, 3);

        store
            .remove_item("B", &VariantSelector::default())
            .await
            .unwrap();
        assert_eq!(store.total().await, dec!(20));
        assert_eq!(store.total_items().await, 2);
    }
}
