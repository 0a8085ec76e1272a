//! Generic RocksDB helpers: configuration and a typed handle wrapper.
//!
//! The handle pairs RocksDB column families with bincode serialization so
//! stores can read and write domain values without repeating the encode/
//! decode and error-mapping boilerplate. Multi-key commits go through
//! [`rocksdb::WriteBatch`], which RocksDB applies atomically.

use crate::error::{Result, SociableError};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Configuration for RocksDB storage.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Maximum number of open files.
    pub max_open_files: i32,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
    /// Maximum number of write buffers.
    pub max_write_buffer_number: i32,
    /// Number of info log files to keep.
    pub keep_log_file_num: usize,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            max_open_files: 64,
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            max_write_buffer_number: 2,
            keep_log_file_num: 2,
        }
    }
}

impl RocksDbConfig {
    /// Builds RocksDB `Options` from this configuration.
    pub fn build_options(&self) -> Options {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(self.max_open_files);
        opts.set_write_buffer_size(self.write_buffer_size);
        opts.set_max_write_buffer_number(self.max_write_buffer_number);
        opts.set_keep_log_file_num(self.keep_log_file_num);
        opts.increase_parallelism(num_cpus::get() as i32);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }
}

/// A wrapper around RocksDB providing typed column-family operations.
pub struct RocksDbHandle {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksDbHandle {
    /// Opens a database at `path` with the given column families.
    pub fn open(
        path: impl AsRef<Path>,
        config: &RocksDbConfig,
        column_families: &[&str],
    ) -> Result<Self> {
        let opts = config.build_options();
        let cf_opts = Options::default();
        let descriptors: Vec<_> = column_families
            .iter()
            .map(|cf| ColumnFamilyDescriptor::new(*cf, cf_opts.clone()))
            .collect();

        let db = DBWithThreadMode::<MultiThreaded>::open_cf_descriptors(
            &opts,
            path.as_ref(),
            descriptors,
        )
        .map_err(|e| SociableError::storage(format!("Failed to open RocksDB: {}", e)))?;

        debug!(path = %path.as_ref().display(), "opened RocksDB");
        Ok(Self { db: Arc::new(db) })
    }

    /// Gets a column family handle.
    pub fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| SociableError::storage(format!("Column family '{}' not found", name)))
    }

    /// Serializes a value for storage.
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| SociableError::serialization(format!("Failed to serialize: {}", e)))
    }

    /// Deserializes a stored value.
    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| SociableError::serialization(format!("Failed to deserialize: {}", e)))
    }

    /// Stores a serializable value at `key`.
    pub fn put<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        self.put_raw(cf_name, key, &Self::encode(value)?)
    }

    /// Stores raw bytes at `key`.
    pub fn put_raw(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self.cf(cf_name)?;
        trace!(cf = cf_name, key_len = key.len(), value_len = value.len(), "db put");
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| SociableError::storage(format!("Failed to write: {}", e)))
    }

    /// Reads and deserializes the value at `key`, if present.
    pub fn get<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        match self.get_raw(cf_name, key)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Reads the raw bytes at `key`, if present.
    pub fn get_raw(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| SociableError::storage(format!("Failed to read: {}", e)))
    }

    /// Deletes the value at `key`. Deleting a missing key is a no-op.
    pub fn delete(&self, cf_name: &str, key: &[u8]) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db
            .delete_cf(&cf, key)
            .map_err(|e| SociableError::storage(format!("Failed to delete: {}", e)))
    }

    /// Deserializes every value in a column family, in key order.
    pub fn values<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) =
                item.map_err(|e| SociableError::storage(format!("Iteration failed: {}", e)))?;
            out.push(Self::decode(&value)?);
        }
        Ok(out)
    }

    /// Applies a write batch atomically.
    pub fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| SociableError::storage(format!("Failed to commit batch: {}", e)))
    }
}
