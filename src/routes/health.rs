use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub version: String,
    pub status: String,
}

pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION").to_string();
    match app_state.db.status_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                version,
                status: "ok".into(),
            }),
        ),
        Err(err) => {
            error!(?err, "database status check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Health {
                    version,
                    status: "db not ready".into(),
                }),
            )
        }
    }
}
