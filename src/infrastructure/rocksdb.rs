use crate::domain::cart::CartLine;
use crate::domain::ports::CartSnapshotStore;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column family holding the cart snapshot.
pub const CF_CART: &str = "cart";
/// Fixed storage key for the single serialized snapshot.
const SNAPSHOT_KEY: &[u8] = b"snapshot";

/// Persistent cart snapshot store backed by RocksDB.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbSnapshotStore {
    db: Arc<DB>,
}

impl RocksDbSnapshotStore {
    /// Opens or creates a RocksDB instance at the given path, ensuring the
    /// cart column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_cart = ColumnFamilyDescriptor::new(CF_CART, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_cart])
            .map_err(|e| CheckoutError::Storage(std::io::Error::other(e.to_string())))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_CART).ok_or_else(|| {
            CheckoutError::Storage(std::io::Error::other("cart column family not found"))
        })
    }
}

#[async_trait]
impl CartSnapshotStore for RocksDbSnapshotStore {
    async fn load(&self) -> Result<Option<Vec<CartLine>>> {
        let cf = self.cf()?;
        let bytes = self
            .db
            .get_cf(cf, SNAPSHOT_KEY)
            .map_err(|e| CheckoutError::Storage(std::io::Error::other(e.to_string())))?;

        match bytes {
            Some(bytes) => {
                let lines = serde_json::from_slice(&bytes)?;
                Ok(Some(lines))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, lines: &[CartLine]) -> Result<()> {
        let cf = self.cf()?;
        let bytes = serde_json::to_vec(lines)?;
        self.db
            .put_cf(cf, SNAPSHOT_KEY, bytes)
            .map_err(|e| CheckoutError::Storage(std::io::Error::other(e.to_string())))?;
        Ok(())
    }
}
