use crate::domain::cart::CartLine;
use crate::domain::ports::CartSnapshotStore;
use crate::error::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Cart snapshot persisted as a JSON array of lines in a single file.
///
/// Each save rewrites the whole snapshot, so concurrent writers degrade to
/// last-write-wins rather than partial corruption.
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CartSnapshotStore for JsonFileSnapshotStore {
    async fn load(&self) -> Result<Option<Vec<CartLine>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let lines = serde_json::from_slice(&bytes)?;
        Ok(Some(lines))
    }

    async fn save(&self, lines: &[CartLine]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(lines)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
