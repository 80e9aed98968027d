//! `park_store` — the key-value state-store collaborator.
//!
//! The core consumes the store, it does not own it: every component takes an
//! `Arc<dyn StateStore>` so tests can substitute [`MemoryStore`] for the
//! Redis backend.

use std::time::Duration;

use async_trait::async_trait;

pub mod keys;
mod memory;
mod records;
mod redis_store;

pub use memory::MemoryStore;
pub use records::{
    coaster_ids, delete_wagon, load_coaster, load_wagon, load_wagons, read_ride_marker,
    register_coaster, save_coaster, save_wagon, wagon_ids, write_ride_marker_if, RideMarker,
};
pub use redis_store::RedisStore;

/// Infrastructure failures. Ride starts fail closed on these; diagnostic
/// reads degrade and log instead of propagating.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),
    #[error("missing record at {key}")]
    Missing { key: String },
    #[error("corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Narrow key-value interface over the shared state store.
///
/// `set_if` is the concurrency primitive: it writes only when the current
/// value matches `expected` (`None` = key absent), atomically. Values written
/// through it must be non-empty.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;
    async fn set_if(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;
    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError>;
    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool, StoreError>;
    /// Members in sorted order, for deterministic iteration.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;
}
