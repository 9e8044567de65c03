//! Adapters behind the domain ports: in-memory/scriptable doubles, a JSON
//! file snapshot store, and an optional RocksDB snapshot store.

pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
