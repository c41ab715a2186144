use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::repositories::{Expected, KeyValueStore, StoreError};

/// In-memory key-value store backed by a hash map. Used by tests and
/// local development; nothing survives the process.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let records = self.records.read().unwrap();
        Ok(records.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap();
        records.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn set_if(
        &self,
        key: &str,
        value: &[u8],
        expected: Expected<'_>,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().unwrap();
        let matches = match (expected, records.get(key)) {
            (Expected::Absent, None) => true,
            (Expected::Bytes(prior), Some(current)) => current.as_slice() == prior,
            _ => false,
        };
        if matches {
            records.insert(key.to_string(), value.to_vec());
        }
        Ok(matches)
    }

    async fn scan(&self, prefix: &str, limit: u32) -> Result<Vec<String>, StoreError> {
        let records = self.records.read().unwrap();
        Ok(records
            .keys()
            .filter(|key| key.starts_with(prefix))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
        let records = self.records.read().unwrap();
        Ok(keys.iter().map(|key| records.get(key).cloned()).collect())
    }
}
