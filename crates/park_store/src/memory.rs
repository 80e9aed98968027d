//! In-memory store backend: the test double, also usable as a standalone
//! single-process mode.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{StateStore, StoreError};

#[derive(Default)]
struct Inner {
    values: HashMap<String, String>,
    sets: HashMap<String, BTreeSet<String>>,
}

/// Process-local [`StateStore`]. TTLs are accepted and ignored; nothing in
/// the scheduling core relies on expiry.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.lock().values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<(), StoreError> {
        self.inner
            .lock()
            .values
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_if(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        if inner.values.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        inner.values.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.lock().values.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.inner
            .lock()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        if let Some(set) = self.inner.lock().sets.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get(key)
            .is_some_and(|set| set.contains(member)))
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .inner
            .lock()
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }
}
