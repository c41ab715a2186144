use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{Expected, KeyValueStore, PartyStore, StoreError};

/// Join party input
pub struct JoinPartyInput {
    pub name: String,
    pub player_id: String,
}

/// Join party output
#[derive(Debug)]
pub struct JoinPartyOutput {
    pub party: Party,
}

/// Join party use case. Adding an already-joined player is a no-op
/// success.
pub struct JoinParty<K: KeyValueStore> {
    party_store: Arc<PartyStore<K>>,
}

impl<K: KeyValueStore> JoinParty<K> {
    pub fn new(party_store: Arc<PartyStore<K>>) -> Self {
        Self { party_store }
    }

    pub async fn execute(&self, input: JoinPartyInput) -> Result<JoinPartyOutput, JoinPartyError> {
        for _ in 0..2 {
            let snapshot = self
                .party_store
                .get(&input.name)
                .await?
                .ok_or(JoinPartyError::PartyNotFound)?;

            if snapshot.party.closed {
                return Err(JoinPartyError::PartyEnded);
            }

            let mut party = snapshot.party.clone();
            party.add_player(&input.player_id);

            if self
                .party_store
                .put_if(&input.name, &party, Expected::Bytes(snapshot.witness()))
                .await?
            {
                tracing::info!(party = %party.name, player = %input.player_id, "player joined");
                return Ok(JoinPartyOutput { party });
            }
        }

        Err(JoinPartyError::ConcurrentUpdate)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinPartyError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("This game has already ended")]
    PartyEnded,
    #[error("Party was changed by another request, try again")]
    ConcurrentUpdate,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
