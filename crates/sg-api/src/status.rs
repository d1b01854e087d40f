use axum::{extract::State, Json};
use sg_profiles::SessionHandle;

use crate::AppState;

/// GET /api/status
///
/// Live sessions known to the session engine. Not registered when status
/// is disabled.
pub async fn status(State(state): State<AppState>) -> Json<Vec<SessionHandle>> {
    Json(state.sessions.active_sessions())
}
