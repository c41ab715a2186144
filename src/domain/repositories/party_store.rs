use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{Expected, KeyValueStore, StoreError};

/// Namespace prefix separating party records from anything else sharing
/// the store.
pub const PARTY_KEY_PREFIX: &str = "party-";

/// A decoded party together with the raw bytes it was read from. The
/// bytes serve as the witness for a later conditional re-write.
#[derive(Debug, Clone)]
pub struct PartySnapshot {
    pub party: Party,
    raw: Vec<u8>,
}

impl PartySnapshot {
    pub fn witness(&self) -> &[u8] {
        &self.raw
    }
}

/// Maps party names to serialized records in the key-value store.
///
/// The store exclusively owns the canonical bytes under a key; decoded
/// `Party` values handed out are transient working copies.
pub struct PartyStore<K: KeyValueStore> {
    kv: Arc<K>,
}

impl<K: KeyValueStore> PartyStore<K> {
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    fn key(name: &str) -> String {
        format!("{PARTY_KEY_PREFIX}{name}")
    }

    /// Fetch and decode the record for `name`. Absent is `None`; bytes
    /// that do not decode surface as `CorruptRecord`.
    pub async fn get(&self, name: &str) -> Result<Option<PartySnapshot>, StoreError> {
        let key = Self::key(name);
        let Some(raw) = self.kv.get(&key).await? else {
            return Ok(None);
        };
        let party = Party::deserialize(&raw).map_err(|e| StoreError::CorruptRecord {
            key,
            reason: e.to_string(),
        })?;
        Ok(Some(PartySnapshot { party, raw }))
    }

    /// Write the record for `name`, overwriting any prior record. Last
    /// writer wins.
    pub async fn put(&self, name: &str, party: &Party) -> Result<(), StoreError> {
        self.kv.set(&Self::key(name), &party.serialize()).await
    }

    /// Conditional write for read-modify-write sequences. Returns false
    /// when the stored record no longer matches `expected`.
    pub async fn put_if(
        &self,
        name: &str,
        party: &Party,
        expected: Expected<'_>,
    ) -> Result<bool, StoreError> {
        self.kv
            .set_if(&Self::key(name), &party.serialize(), expected)
            .await
    }

    /// Enumerate up to `limit` party records in a single scan plus one
    /// batch read. Order follows the backend's enumeration order.
    pub async fn list_all(&self, limit: u32) -> Result<Vec<Party>, StoreError> {
        let keys = self.kv.scan(PARTY_KEY_PREFIX, limit).await?;
        let values = self.kv.multi_get(&keys).await?;

        let mut parties = Vec::with_capacity(keys.len());
        for (key, value) in keys.into_iter().zip(values) {
            let Some(raw) = value else { continue };
            let party = Party::deserialize(&raw).map_err(|e| StoreError::CorruptRecord {
                key,
                reason: e.to_string(),
            })?;
            parties.push(party);
        }
        Ok(parties)
    }
}
