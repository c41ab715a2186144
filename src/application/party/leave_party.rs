use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{Expected, KeyValueStore, PartyStore, StoreError};

/// Leave party input
pub struct LeavePartyInput {
    pub name: String,
    pub player_id: String,
}

/// Leave party output
#[derive(Debug)]
pub struct LeavePartyOutput {
    pub party: Party,
    /// True when this departure emptied the party and closed it.
    pub closed: bool,
}

/// Leave party use case. Removing the last player closes the record,
/// which frees the name for re-creation.
pub struct LeaveParty<K: KeyValueStore> {
    party_store: Arc<PartyStore<K>>,
}

impl<K: KeyValueStore> LeaveParty<K> {
    pub fn new(party_store: Arc<PartyStore<K>>) -> Self {
        Self { party_store }
    }

    pub async fn execute(
        &self,
        input: LeavePartyInput,
    ) -> Result<LeavePartyOutput, LeavePartyError> {
        for _ in 0..2 {
            let snapshot = self
                .party_store
                .get(&input.name)
                .await?
                .ok_or(LeavePartyError::PartyNotFound)?;

            let was_closed = snapshot.party.closed;
            let mut party = snapshot.party.clone();
            party.remove_player(&input.player_id);

            if self
                .party_store
                .put_if(&input.name, &party, Expected::Bytes(snapshot.witness()))
                .await?
            {
                let closed = party.closed && !was_closed;
                if closed {
                    tracing::info!(party = %party.name, "last player left, party closed");
                }
                return Ok(LeavePartyOutput { party, closed });
            }
        }

        Err(LeavePartyError::ConcurrentUpdate)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LeavePartyError {
    #[error("Party not found")]
    PartyNotFound,
    #[error("Party was changed by another request, try again")]
    ConcurrentUpdate,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
