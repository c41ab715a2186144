pub mod middleware;
pub mod routes;

// Re-export for convenience
pub use crate::infrastructure::app_state::AppState;
