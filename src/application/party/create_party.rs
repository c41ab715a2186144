use std::sync::Arc;

use crate::domain::entities::Party;
use crate::domain::repositories::{Expected, KeyValueStore, PartyStore, StoreError};

/// Create party input
pub struct CreatePartyInput {
    pub name: String,
    pub player_id: String,
}

/// How the create request resolved against the existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// No record existed under the name.
    Created,
    /// A finished record existed and was replaced by a fresh one.
    Recreated,
}

/// Create party output
#[derive(Debug)]
pub struct CreatePartyOutput {
    pub party: Party,
    pub outcome: CreateOutcome,
    pub message: String,
}

/// Create party use case.
///
/// Collision policy: an open party blocks the name; a closed party is
/// silently replaced by a brand-new record (fresh id, fresh player set)
/// under the same name.
pub struct CreateParty<K: KeyValueStore> {
    party_store: Arc<PartyStore<K>>,
}

impl<K: KeyValueStore> CreateParty<K> {
    pub fn new(party_store: Arc<PartyStore<K>>) -> Self {
        Self { party_store }
    }

    pub async fn execute(
        &self,
        input: CreatePartyInput,
    ) -> Result<CreatePartyOutput, CreatePartyError> {
        // The name is length-validated at the boundary; reject the empty
        // string here so a bad caller cannot mint the bare prefix key.
        if input.name.trim().is_empty() {
            return Err(CreatePartyError::Validation("Party name is required".into()));
        }

        // Read-decide-write. The conditional write can lose to a
        // concurrent request, in which case the decision is re-run once
        // against the fresh record before giving up.
        for _ in 0..2 {
            let existing = self.party_store.get(&input.name).await?;

            let (expected, outcome) = match &existing {
                None => (Expected::Absent, CreateOutcome::Created),
                Some(snapshot) if snapshot.party.closed => {
                    (Expected::Bytes(snapshot.witness()), CreateOutcome::Recreated)
                }
                Some(_) => {
                    return Err(CreatePartyError::NameConflict { name: input.name });
                }
            };

            let mut party = Party::new(input.name.as_str());
            party.add_player(&input.player_id);

            if self.party_store.put_if(&input.name, &party, expected).await? {
                let message = match outcome {
                    CreateOutcome::Created => {
                        format!("Creating a game (named {}). Please join manually.", party.name)
                    }
                    CreateOutcome::Recreated => format!(
                        "Re-creating a game (named {}). Click now on the right game to join the game.",
                        party.name
                    ),
                };
                tracing::info!(party = %party.name, player = %input.player_id, "party created");
                return Ok(CreatePartyOutput {
                    party,
                    outcome,
                    message,
                });
            }
        }

        Err(CreatePartyError::ConcurrentUpdate { name: input.name })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreatePartyError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("A game named {name} already exists")]
    NameConflict { name: String },
    #[error("Party {name} was changed by another request, try again")]
    ConcurrentUpdate { name: String },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
