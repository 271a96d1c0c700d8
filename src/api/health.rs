use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::models::SessionState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub session: SessionState,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.status().await.state;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        session,
    })
}
