use async_trait::async_trait;

/// Store-level error taxonomy. An absent key is not an error; reads
/// model it as `None`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("corrupt record at {key}: {reason}")]
    CorruptRecord { key: String, reason: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Prior state a conditional write must observe to take effect.
#[derive(Debug, Clone, Copy)]
pub enum Expected<'a> {
    /// The key must not exist yet.
    Absent,
    /// The key must currently hold exactly these bytes.
    Bytes(&'a [u8]),
}

/// Byte-oriented key-value storage shared by every request.
///
/// Keys are plain strings; callers namespace them with a prefix to keep
/// record families apart. `set_if` is the one concession to concurrent
/// writers: a compare-and-swap against the bytes a caller previously
/// read, so read-modify-write sequences can detect lost updates.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the bytes under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write `value` under `key`, overwriting unconditionally.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Conditional write: stores `value` only when the key's current
    /// content matches `expected`. Returns whether the write happened.
    async fn set_if(
        &self,
        key: &str,
        value: &[u8],
        expected: Expected<'_>,
    ) -> Result<bool, StoreError>;

    /// Enumerate up to `limit` keys starting with `prefix`. Order is
    /// whatever the backend yields; it is not stable between calls.
    async fn scan(&self, prefix: &str, limit: u32) -> Result<Vec<String>, StoreError>;

    /// Batch fetch, one entry per requested key, `None` for absent keys.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError>;
}
