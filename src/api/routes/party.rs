use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Claims;
use crate::api::AppState;
use crate::application::party::{
    CreateOutcome, CreateParty, CreatePartyError, CreatePartyInput, JoinParty, JoinPartyError,
    JoinPartyInput, LeaveParty, LeavePartyError, LeavePartyInput, ListParties, ListPartiesError,
    ListPartiesInput,
};
use crate::domain::entities::Party;
use crate::domain::repositories::StoreError;

/// Party names are validated to this length before the use case runs,
/// mirroring the form validation on the client side.
const PARTY_NAME_MAX_LEN: usize = 20;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PartyResponse {
    pub name: String,
    pub id: String,
    pub players: Vec<String>,
    #[serde(rename = "currentlyPlaying")]
    pub currently_playing: String,
    pub closed: bool,
}

impl PartyResponse {
    fn from_party(party: &Party) -> Self {
        Self {
            name: party.name.clone(),
            id: party.id.clone(),
            players: party.players.iter().cloned().collect(),
            currently_playing: party.currently_playing.clone(),
            closed: party.closed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePartyResponse {
    pub success: bool,
    /// "created" or "recreated"
    pub outcome: String,
    pub message: String,
    pub party: PartyResponse,
}

#[derive(Debug, Serialize)]
pub struct PartyListItem {
    pub name: String,
    pub players: Vec<String>,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct ListPartiesResponse {
    pub success: bool,
    pub parties: Vec<PartyListItem>,
}

#[derive(Debug, Serialize)]
pub struct JoinPartyResponse {
    pub success: bool,
    pub party: PartyResponse,
}

#[derive(Debug, Serialize)]
pub struct LeavePartyResponse {
    pub success: bool,
    pub message: String,
    pub closed: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn error_response(status: StatusCode, code: &str, error: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
        }),
    )
}

fn store_error_code(e: &StoreError) -> &'static str {
    match e {
        StoreError::CorruptRecord { .. } => "CORRUPT_RECORD",
        StoreError::Unavailable(_) => "STORE_ERROR",
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/party - Create a new party
pub async fn create_party(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreatePartyRequest>,
) -> Result<(StatusCode, Json<CreatePartyResponse>), (StatusCode, Json<ErrorResponse>)> {
    if body.name.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "MISSING_PARTY_NAME",
            "Party name is required".to_string(),
        ));
    }
    if body.name.chars().count() > PARTY_NAME_MAX_LEN {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "PARTY_NAME_TOO_LONG",
            format!("Party name must be at most {} characters", PARTY_NAME_MAX_LEN),
        ));
    }

    let use_case = CreateParty::new(state.party_store.clone());
    let result = use_case
        .execute(CreatePartyInput {
            name: body.name,
            player_id: claims.username.clone(),
        })
        .await
        .map_err(|e| match &e {
            CreatePartyError::Validation(_) => {
                error_response(StatusCode::BAD_REQUEST, "INVALID_PARTY_NAME", e.to_string())
            }
            CreatePartyError::NameConflict { name } => error_response(
                StatusCode::CONFLICT,
                "PARTY_EXISTS",
                format!("A game named {name} already exists. Redirecting you to join page...."),
            ),
            CreatePartyError::ConcurrentUpdate { .. } => {
                error_response(StatusCode::CONFLICT, "PARTY_CONTENTION", e.to_string())
            }
            CreatePartyError::Store(store_err) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                store_error_code(store_err),
                e.to_string(),
            ),
        })?;

    let outcome = match result.outcome {
        CreateOutcome::Created => "created",
        CreateOutcome::Recreated => "recreated",
    };

    Ok((
        StatusCode::CREATED,
        Json(CreatePartyResponse {
            success: true,
            outcome: outcome.to_string(),
            message: result.message,
            party: PartyResponse::from_party(&result.party),
        }),
    ))
}

/// GET /api/party - List parties in the lobby
pub async fn list_parties(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<ListPartiesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = ListParties::new(state.party_store.clone());
    let result = use_case
        .execute(ListPartiesInput {
            limit: state.max_list_records,
        })
        .await
        .map_err(|e| match &e {
            ListPartiesError::Store(store_err) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                store_error_code(store_err),
                e.to_string(),
            ),
        })?;

    Ok(Json(ListPartiesResponse {
        success: true,
        parties: result
            .parties
            .into_iter()
            .map(|p| PartyListItem {
                name: p.name,
                players: p.players,
                link: p.link,
            })
            .collect(),
    }))
}

/// POST /api/party/:name/join - Join a party
pub async fn join_party(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
) -> Result<Json<JoinPartyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = JoinParty::new(state.party_store.clone());
    let result = use_case
        .execute(JoinPartyInput {
            name,
            player_id: claims.username.clone(),
        })
        .await
        .map_err(|e| match &e {
            JoinPartyError::PartyNotFound => {
                error_response(StatusCode::NOT_FOUND, "PARTY_NOT_FOUND", e.to_string())
            }
            JoinPartyError::PartyEnded => {
                error_response(StatusCode::GONE, "PARTY_ENDED", e.to_string())
            }
            JoinPartyError::ConcurrentUpdate => {
                error_response(StatusCode::CONFLICT, "PARTY_CONTENTION", e.to_string())
            }
            JoinPartyError::Store(store_err) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                store_error_code(store_err),
                e.to_string(),
            ),
        })?;

    Ok(Json(JoinPartyResponse {
        success: true,
        party: PartyResponse::from_party(&result.party),
    }))
}

/// POST /api/party/:name/leave - Leave a party
pub async fn leave_party(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
) -> Result<Json<LeavePartyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = LeaveParty::new(state.party_store.clone());
    let result = use_case
        .execute(LeavePartyInput {
            name,
            player_id: claims.username.clone(),
        })
        .await
        .map_err(|e| match &e {
            LeavePartyError::PartyNotFound => {
                error_response(StatusCode::NOT_FOUND, "PARTY_NOT_FOUND", e.to_string())
            }
            LeavePartyError::ConcurrentUpdate => {
                error_response(StatusCode::CONFLICT, "PARTY_CONTENTION", e.to_string())
            }
            LeavePartyError::Store(store_err) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                store_error_code(store_err),
                e.to_string(),
            ),
        })?;

    let message = if result.closed {
        "Left party, the game is now closed".to_string()
    } else {
        "Left party successfully".to_string()
    };

    Ok(Json(LeavePartyResponse {
        success: true,
        message,
        closed: result.closed,
    }))
}
