use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use crate::domain::repositories::PartyStore;
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::database::SqliteKeyValueStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// JWT service for the identity boundary
    pub jwt_service: Arc<JwtService>,

    /// Party store over the shared key-value backend
    pub party_store: Arc<PartyStore<SqliteKeyValueStore>>,

    /// Upper bound on records returned by the lobby listing
    pub max_list_records: u32,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        // Get database path from environment
        let db_path = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/parties.db".to_string());

        // Ensure path has sqlite: prefix
        let db_url = if db_path.starts_with("sqlite:") {
            db_path
        } else {
            format!("sqlite:{}", db_path)
        };

        tracing::info!("Connecting to database: {}", db_url);

        let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);
        let db = SqlitePool::connect_with(options).await?;

        let kv = SqliteKeyValueStore::new(db);
        kv.init().await?;
        let party_store = Arc::new(PartyStore::new(Arc::new(kv)));

        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "party-secret-key-change-in-production".to_string());
        let jwt_service = Arc::new(JwtService::new(jwt_secret));

        let max_list_records = std::env::var("MAX_PARTY_LIST_RECORDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        Ok(Self {
            jwt_service,
            party_store,
            max_list_records,
        })
    }
}
