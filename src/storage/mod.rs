//! Storage utilities and abstractions.
//!
//! This module provides the shared RocksDB infrastructure used by the
//! persistent social store. It contains no domain logic; for the store
//! itself see [`crate::social::storage`].

pub mod rocksdb;

pub use rocksdb::{RocksDbConfig, RocksDbHandle};
