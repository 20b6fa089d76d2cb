use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::{
    db::is_unique_violation,
    errors::AppError,
    models::user::{NewUser, UpdateUser, User, ROLE_ADMIN, ROLE_USER},
    routes::{
        auth::{
            access::{authorize, is_owner_or_admin},
            session::AuthSession,
        },
        parse_id,
    },
    state::AppState,
    utils::password::hash_password,
};

const MSG_USER_NOT_FOUND: &str = "User not found";
const MSG_EMAIL_TAKEN: &str = "email is already registered";

fn validate_password(password: &str, confirm: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::InvalidInput("password must not be empty".into()));
    }
    if password != confirm {
        return Err(AppError::InvalidInput("passwords do not match".into()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(AppError::InvalidInput("a valid email is required".into()));
    }
    Ok(())
}

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|err| {
        tracing::error!(?err, "password hashing failed");
        AppError::Infrastructure("internal server error".into())
    })
}

fn map_unique(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(MSG_EMAIL_TAKEN.into())
    } else {
        AppError::from(err)
    }
}

pub async fn register_user(
    State(app_state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    validate_email(&payload.email)?;
    validate_password(&payload.password, &payload.password_confirm)?;

    let password_hash = hash(&payload.password)?;
    let user = app_state
        .db
        .create_user(
            payload.name.trim(),
            payload.email.trim(),
            &password_hash,
            &[ROLE_USER.to_string()],
        )
        .await
        .map_err(map_unique)?;

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Vec<User>>, AppError> {
    if !authorize(&claims, ROLE_ADMIN) {
        return Err(AppError::admin_only());
    }
    Ok(Json(app_state.db.list_users().await?))
}

pub async fn get_user(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    let user_id = parse_id(&user_id)?;
    if !is_owner_or_admin(&claims, user_id) {
        return Err(AppError::not_allowed());
    }

    app_state
        .db
        .find_user_by_id(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(MSG_USER_NOT_FOUND.into()))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<User>, AppError> {
    let user_id = parse_id(&user_id)?;
    if !is_owner_or_admin(&claims, user_id) {
        return Err(AppError::not_allowed());
    }
    if payload.roles.is_some() && !authorize(&claims, ROLE_ADMIN) {
        warn!(sub = %claims.sub, %user_id, "non-admin attempted to change roles");
        return Err(AppError::not_allowed());
    }

    let mut user = app_state
        .db
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(MSG_USER_NOT_FOUND.into()))?;

    if let Some(name) = payload.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = payload.email {
        validate_email(&email)?;
        user.email = email.trim().to_string();
    }
    if let Some(roles) = payload.roles {
        user.roles = roles;
    }
    if let Some(password) = payload.password {
        validate_password(&password, payload.password_confirm.as_deref().unwrap_or(""))?;
        user.password_hash = hash(&password)?;
    }

    let updated = app_state
        .db
        .update_user(&user)
        .await
        .map_err(map_unique)?
        .ok_or_else(|| AppError::NotFound(MSG_USER_NOT_FOUND.into()))?;

    info!(%user_id, "user updated");
    Ok(Json(updated))
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = parse_id(&user_id)?;
    if !is_owner_or_admin(&claims, user_id) {
        return Err(AppError::not_allowed());
    }

    if !app_state.db.delete_user(user_id).await? {
        return Err(AppError::NotFound(MSG_USER_NOT_FOUND.into()));
    }
    info!(%user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
