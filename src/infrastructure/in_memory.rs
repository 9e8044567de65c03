use crate::domain::cart::CartLine;
use crate::domain::order::OneClickOrder;
use crate::domain::payment::{PaymentLookup, PaymentRecord, PaymentStatus};
use crate::domain::ports::{CartSnapshotStore, OrderGateway, PaymentStatusSource, ProductCatalog};
use crate::domain::product::Product;
use crate::error::{CheckoutError, RejectionReason, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Cart snapshot store backed by process memory. Used in tests and as the
/// storage double wherever durability is not needed.
#[derive(Default, Clone)]
pub struct InMemorySnapshotStore {
    lines: Arc<RwLock<Option<Vec<CartLine>>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartSnapshotStore for InMemorySnapshotStore {
    async fn load(&self) -> Result<Option<Vec<CartLine>>> {
        Ok(self.lines.read().await.clone())
    }

    async fn save(&self, lines: &[CartLine]) -> Result<()> {
        *self.lines.write().await = Some(lines.to_vec());
        Ok(())
    }
}

/// One scripted response of the payment status source.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// No record exists yet for the order.
    NotYetCreated,
    /// The record exists with the given status.
    Status(PaymentStatus),
    /// The fetch fails transiently with the given message.
    Transient(String),
}

impl FromStr for ScriptStep {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "missing" => Ok(Self::NotYetCreated),
            "error" | "unavailable" => Ok(Self::Transient("scripted outage".to_string())),
            other => other.parse::<PaymentStatus>().map(Self::Status),
        }
    }
}

#[derive(Default)]
struct ScriptedInner {
    products: RwLock<HashMap<String, Product>>,
    orders: RwLock<Vec<OneClickOrder>>,
    script: RwLock<VecDeque<ScriptStep>>,
    current: RwLock<Option<PaymentRecord>>,
    rejection: RwLock<Option<RejectionReason>>,
    catalog_failures: AtomicU32,
    fetches: AtomicU32,
}

/// A scriptable stand-in for the hosted backend: product catalog, order
/// gateway, and payment status source in one.
///
/// Status fetches consume the script one step per fetch; once the script
/// is exhausted the last produced record (or its absence) repeats, which
/// mirrors a backend whose webhook has stopped advancing the row.
#[derive(Default, Clone)]
pub struct ScriptedBackend {
    inner: Arc<ScriptedInner>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_product(self, product: Product) -> Self {
        self.inner
            .products
            .write()
            .await
            .insert(product.id.clone(), product);
        self
    }

    pub async fn with_script(self, steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        self.inner.script.write().await.extend(steps);
        self
    }

    /// Appends a status transition to the script after start.
    pub async fn push_status(&self, status: PaymentStatus) {
        self.inner
            .script
            .write()
            .await
            .push_back(ScriptStep::Status(status));
    }

    /// Makes subsequent order submissions fail with the given reason.
    pub async fn reject_submissions(&self, reason: RejectionReason) {
        *self.inner.rejection.write().await = Some(reason);
    }

    /// Makes the next `n` catalog fetches fail transiently.
    pub fn fail_next_catalog_fetches(&self, n: u32) {
        self.inner.catalog_failures.store(n, Ordering::SeqCst);
    }

    pub async fn submitted_orders(&self) -> Vec<OneClickOrder> {
        self.inner.orders.read().await.clone()
    }

    pub fn fetch_count(&self) -> u32 {
        self.inner.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductCatalog for ScriptedBackend {
    async fn product(&self, product_id: &str) -> Result<Option<Product>> {
        let failures = self.inner.catalog_failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.inner
                .catalog_failures
                .store(failures - 1, Ordering::SeqCst);
            return Err(CheckoutError::BackendUnavailable(
                "catalog unavailable".to_string(),
            ));
        }
        Ok(self.inner.products.read().await.get(product_id).cloned())
    }
}

#[async_trait]
impl OrderGateway for ScriptedBackend {
    async fn submit_one_click(&self, order: &OneClickOrder) -> Result<String> {
        if let Some(reason) = self.inner.rejection.read().await.clone() {
            return Err(CheckoutError::BackendRejection(reason));
        }
        self.inner.orders.write().await.push(order.clone());
        Ok(format!("ord-{}", Uuid::new_v4()))
    }
}

#[async_trait]
impl PaymentStatusSource for ScriptedBackend {
    async fn fetch(&self, order_id: &str) -> Result<PaymentLookup> {
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);

        let step = self.inner.script.write().await.pop_front();
        match step {
            Some(ScriptStep::NotYetCreated) => Ok(PaymentLookup::NotYetCreated),
            Some(ScriptStep::Transient(message)) => Err(CheckoutError::BackendUnavailable(message)),
            Some(ScriptStep::Status(status)) => {
                let amount = self
                    .inner
                    .orders
                    .read()
                    .await
                    .last()
                    .map(|o| o.unit_price)
                    .unwrap_or(Decimal::ZERO);
                let mut current = self.inner.current.write().await;
                let record = match current.take() {
                    Some(mut record) => {
                        record.status = status;
                        record.updated_at = Utc::now();
                        record
                    }
                    None => PaymentRecord {
                        id: Uuid::new_v4(),
                        order_id: order_id.to_string(),
                        amount,
                        currency: "TJS".to_string(),
                        status,
                        transaction_id: None,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    },
                };
                *current = Some(record.clone());
                Ok(PaymentLookup::Found(record))
            }
            // Script exhausted: the backend row simply stops changing.
            None => match self.inner.current.read().await.clone() {
                Some(record) => Ok(PaymentLookup::Found(record)),
                None => Ok(PaymentLookup::NotYetCreated),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(product_id: &str) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            variant_id: None,
            size_label: None,
            name: product_id.to_string(),
            unit_price: dec!(10),
            quantity: 2,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_snapshot_store_round_trip() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load().await.unwrap().is_none());

        let lines = vec![line("A")];
        store.save(&lines).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap(), lines);
    }

    #[tokio::test]
    async fn test_snapshot_store_shared_across_tasks() {
        let store = InMemorySnapshotStore::new();
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.save(&[line(&format!("product-{i}"))]).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Last write wins; every writer completed without panicking.
        assert_eq!(store.load().await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_script_consumed_in_order_then_repeats_last() {
        let backend = ScriptedBackend::new()
            .with_script([
                ScriptStep::NotYetCreated,
                ScriptStep::Status(PaymentStatus::Processing),
            ])
            .await;

        assert_eq!(
            backend.fetch("o").await.unwrap(),
            PaymentLookup::NotYetCreated
        );
        let PaymentLookup::Found(record) = backend.fetch("o").await.unwrap() else {
            panic!("expected record");
        };
        assert_eq!(record.status, PaymentStatus::Processing);

        // Exhausted script repeats the last known record.
        let PaymentLookup::Found(again) = backend.fetch("o").await.unwrap() else {
            panic!("expected record");
        };
        assert_eq!(again.status, PaymentStatus::Processing);
        assert_eq!(backend.fetch_count(), 3);
    }

    #[test]
    fn test_script_step_parsing() {
        assert_eq!("none".parse::<ScriptStep>(), Ok(ScriptStep::NotYetCreated));
        assert_eq!(
            "completed".parse::<ScriptStep>(),
            Ok(ScriptStep::Status(PaymentStatus::Completed))
        );
        assert!(matches!(
            "error".parse::<ScriptStep>(),
            Ok(ScriptStep::Transient(_))
        ));
        assert!("paid".parse::<ScriptStep>().is_err());
    }
}
