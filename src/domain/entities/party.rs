use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version tag written into every stored party record. Bump when the
/// record schema changes shape.
const RECORD_VERSION: u32 = 1;

/// Party entity: one named game lobby.
///
/// A party is keyed by its human-chosen `name` in the store, while `id`
/// is the generated public handle embedded in shareable join links. The
/// player set collapses duplicates; an ordered set keeps the encoded
/// record bytes deterministic for a given state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub name: String,
    pub id: String,
    pub players: BTreeSet<String>,
    pub currently_playing: String,
    pub closed: bool,
}

impl Party {
    /// Create a new open party with no players and a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: Uuid::new_v4().to_string(),
            players: BTreeSet::new(),
            currently_playing: String::new(),
            closed: false,
        }
    }

    /// Add a player to the party. Idempotent. The first player ever
    /// added becomes `currently_playing`; later additions never change
    /// it.
    pub fn add_player(&mut self, player_id: &str) {
        if self.players.is_empty() {
            self.currently_playing = player_id.to_string();
        }
        self.players.insert(player_id.to_string());
    }

    /// Remove a player from the party. Idempotent. When the removal
    /// empties the player set, the party closes automatically.
    pub fn remove_player(&mut self, player_id: &str) {
        if self.players.remove(player_id) && self.players.is_empty() {
            self.closed = true;
        }
    }

    /// Mark the party as finished. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Encode the party into its versioned record bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let record = PartyRecord {
            version: RECORD_VERSION,
            name: self.name.clone(),
            id: self.id.clone(),
            players: self.players.clone(),
            currently_playing: self.currently_playing.clone(),
            closed: self.closed,
        };
        // JSON encoding of the record shape cannot fail
        serde_json::to_vec(&record).expect("party record encodes as JSON")
    }

    /// Decode a party from stored record bytes. Malformed bytes and
    /// unknown record versions are distinct, recoverable errors, never
    /// mistaken for an absent record.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, PartyRecordError> {
        let record: PartyRecord = serde_json::from_slice(bytes)?;
        if record.version != RECORD_VERSION {
            return Err(PartyRecordError::UnsupportedVersion(record.version));
        }
        Ok(Self {
            name: record.name,
            id: record.id,
            players: record.players,
            currently_playing: record.currently_playing,
            closed: record.closed,
        })
    }
}

/// On-disk shape of a party record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartyRecord {
    version: u32,
    name: String,
    id: String,
    players: BTreeSet<String>,
    currently_playing: String,
    closed: bool,
}

/// Party record decode errors
#[derive(Debug, thiserror::Error)]
pub enum PartyRecordError {
    #[error("unsupported party record version {0}")]
    UnsupportedVersion(u32),
    #[error("malformed party record: {0}")]
    Malformed(#[from] serde_json::Error),
}
