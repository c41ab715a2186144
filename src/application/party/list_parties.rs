use std::sync::Arc;

use crate::domain::repositories::{KeyValueStore, PartyStore, StoreError};

/// Path under which a party's game page is reachable. The id segment is
/// the party's stable public handle.
const GAME_LINK_BASE: &str = "/games/ideasthesia";

/// List parties input
pub struct ListPartiesInput {
    /// Upper bound on how many records the directory scan may return.
    pub limit: u32,
}

/// Display projection of one party for the lobby roster. Never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyDisplay {
    pub name: String,
    pub players: Vec<String>,
    pub link: String,
}

/// List parties output
pub struct ListPartiesOutput {
    pub parties: Vec<PartyDisplay>,
}

/// List parties use case. Order of the roster follows the store's
/// enumeration order.
pub struct ListParties<K: KeyValueStore> {
    party_store: Arc<PartyStore<K>>,
}

impl<K: KeyValueStore> ListParties<K> {
    pub fn new(party_store: Arc<PartyStore<K>>) -> Self {
        Self { party_store }
    }

    pub async fn execute(
        &self,
        input: ListPartiesInput,
    ) -> Result<ListPartiesOutput, ListPartiesError> {
        let parties = self
            .party_store
            .list_all(input.limit)
            .await?
            .into_iter()
            .map(|party| PartyDisplay {
                link: format!("{GAME_LINK_BASE}/{}", party.id),
                players: party.players.into_iter().collect(),
                name: party.name,
            })
            .collect();

        Ok(ListPartiesOutput { parties })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListPartiesError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
