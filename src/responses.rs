use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// Error envelope shared by every endpoint: `{"error":{"message":"..."}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse {
    pub error: ErrorMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: String,
}

impl JsonResponse {
    pub fn error(status: StatusCode, msg: &str) -> impl IntoResponse {
        (
            status,
            Json(JsonResponse {
                error: ErrorMessage {
                    message: msg.to_string(),
                },
            }),
        )
    }

    pub fn created(msg: &str) -> impl IntoResponse {
        (
            StatusCode::CREATED,
            Json(SuccessResponse {
                success: msg.to_string(),
            }),
        )
    }
}
