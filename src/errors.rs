use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::engine::VoteError;
use crate::responses::JsonResponse;
use crate::services::authenticator::AuthError;
use crate::utils::jwt::TokenError;

pub const MSG_ADMIN_ONLY: &str = "data is available only for admin";
pub const MSG_BAD_ID: &str = "ID is not in its proper form";
pub const MSG_BAD_DATE: &str = "invalid date format";
pub const MSG_NOT_ALLOWED: &str = "Attempted action is not allowed";
const MSG_INTERNAL: &str = "internal server error";

/// Every failure a handler can surface. Each variant maps to exactly one
/// HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("AuthenticationFailed")]
    AuthenticationFailed,
    #[error("must provide email and password in Basic auth")]
    MissingCredentials,
    #[error("no token found")]
    NoToken,
    #[error("invalid token")]
    TokenInvalid,
    #[error("invalid token")]
    TokenExpired,
    #[error("{0}")]
    Forbidden(String),
    #[error("user has already voted today")]
    AlreadyVoted,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Infrastructure(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthenticationFailed
            | AppError::MissingCredentials
            | AppError::NoToken
            | AppError::TokenInvalid
            | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::AlreadyVoted => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn admin_only() -> Self {
        AppError::Forbidden(MSG_ADMIN_ONLY.to_string())
    }

    pub fn not_allowed() -> Self {
        AppError::Forbidden(MSG_NOT_ALLOWED.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        match &self {
            AppError::Infrastructure(_) => error!(%status, %message, "request failed"),
            AppError::Forbidden(_) => warn!(%status, %message, "request forbidden"),
            AppError::TokenExpired => info!(%status, "expired token presented"),
            AppError::AlreadyVoted | AppError::Conflict(_) => info!(%status, %message, "conflict"),
            _ => {}
        }
        JsonResponse::error(status, &message).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed => AppError::AuthenticationFailed,
            AuthError::StoreUnavailable(source) => {
                error!(?source, "credential store unavailable");
                AppError::Infrastructure(MSG_INTERNAL.to_string())
            }
            AuthError::Token(source) => AppError::from(source),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Malformed | TokenError::InvalidSignature => AppError::TokenInvalid,
            TokenError::Signing => AppError::Infrastructure(MSG_INTERNAL.to_string()),
        }
    }
}

impl From<VoteError> for AppError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::AlreadyVoted => AppError::AlreadyVoted,
            VoteError::MenuNotFound(_) => AppError::NotFound("menu not found".to_string()),
            VoteError::Store { stage, source } => {
                error!(%stage, ?source, "vote store failure");
                AppError::Infrastructure(MSG_INTERNAL.to_string())
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        error!(?err, "database error");
        AppError::Infrastructure(MSG_INTERNAL.to_string())
    }
}
