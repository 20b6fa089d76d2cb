use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    db::{is_unique_violation, restaurant_repository::MenuUpsert},
    errors::AppError,
    models::{
        restaurant::{Menu, NewRestaurant, Restaurant, UpsertMenu},
        user::ROLE_ADMIN,
    },
    routes::{
        auth::{
            access::{authorize, can_manage_restaurant},
            session::AuthSession,
        },
        parse_id, DateQuery,
    },
    state::AppState,
};

const MSG_RESTAURANT_NOT_FOUND: &str = "restaurant not found";
const MSG_MENU_NOT_FOUND: &str = "menu not found";
const MSG_MENU_DATE_TAKEN: &str = "restaurant already has a menu for that date";

pub async fn list_restaurants(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    Ok(Json(app_state.restaurant_repo.list_restaurants().await?))
}

pub async fn get_restaurant(
    State(app_state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> Result<Json<Restaurant>, AppError> {
    let restaurant_id = parse_id(&restaurant_id)?;
    app_state
        .restaurant_repo
        .find_restaurant(restaurant_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(MSG_RESTAURANT_NOT_FOUND.into()))
}

pub async fn create_restaurant(
    State(app_state): State<AppState>,
    session: AuthSession,
    Json(payload): Json<NewRestaurant>,
) -> Result<(StatusCode, Json<Restaurant>), AppError> {
    if !authorize(&session.0, ROLE_ADMIN) {
        return Err(AppError::admin_only());
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("restaurant name is required".into()));
    }
    let owner = session.user_id()?;

    let restaurant = app_state
        .restaurant_repo
        .create_restaurant(owner, &payload)
        .await?;
    info!(restaurant_id = %restaurant.id, %owner, "restaurant created");
    Ok((StatusCode::CREATED, Json(restaurant)))
}

pub async fn delete_restaurant(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(restaurant_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !authorize(&claims, ROLE_ADMIN) {
        return Err(AppError::admin_only());
    }
    let restaurant_id = parse_id(&restaurant_id)?;

    if !app_state
        .restaurant_repo
        .delete_restaurant(restaurant_id)
        .await?
    {
        return Err(AppError::NotFound(MSG_RESTAURANT_NOT_FOUND.into()));
    }
    info!(%restaurant_id, "restaurant deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_menus(
    State(app_state): State<AppState>,
    Path(restaurant_id): Path<String>,
) -> Result<Json<Vec<Menu>>, AppError> {
    let restaurant_id = parse_id(&restaurant_id)?;
    Ok(Json(
        app_state
            .restaurant_repo
            .list_menus_for_restaurant(restaurant_id)
            .await?,
    ))
}

pub async fn get_menu(
    State(app_state): State<AppState>,
    Path((restaurant_id, menu_id)): Path<(String, String)>,
) -> Result<Json<Menu>, AppError> {
    let restaurant_id = parse_id(&restaurant_id)?;
    let menu_id = parse_id(&menu_id)?;
    app_state
        .restaurant_repo
        .find_menu(restaurant_id, menu_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(MSG_MENU_NOT_FOUND.into()))
}

/// Creates the menu for (restaurant, date) or replaces its text. Vote counts
/// are never touched here.
pub async fn upsert_menu(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(restaurant_id): Path<String>,
    Json(payload): Json<UpsertMenu>,
) -> Result<(StatusCode, Json<Menu>), AppError> {
    let restaurant_id = parse_id(&restaurant_id)?;
    let restaurant = app_state
        .restaurant_repo
        .find_restaurant(restaurant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(MSG_RESTAURANT_NOT_FOUND.into()))?;

    if !can_manage_restaurant(&claims, &restaurant) {
        return Err(AppError::not_allowed());
    }

    let outcome = app_state
        .restaurant_repo
        .upsert_menu(restaurant_id, &payload)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => AppError::NotFound(MSG_MENU_NOT_FOUND.into()),
            err if is_unique_violation(&err) => AppError::Conflict(MSG_MENU_DATE_TAKEN.into()),
            other => AppError::from(other),
        })?;

    match outcome {
        MenuUpsert::Created(menu) => {
            info!(%restaurant_id, menu_id = %menu.id, date = %menu.date, "menu created");
            Ok((StatusCode::CREATED, Json(menu)))
        }
        MenuUpsert::Updated(menu) => {
            info!(%restaurant_id, menu_id = %menu.id, date = %menu.date, "menu updated");
            Ok((StatusCode::OK, Json(menu)))
        }
    }
}

/// All menus offered on `?date=` (today when absent).
pub async fn list_menus_by_date(
    State(app_state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<Menu>>, AppError> {
    let date = query.or_today()?;
    Ok(Json(
        app_state.restaurant_repo.list_menus_by_date(date).await?,
    ))
}
