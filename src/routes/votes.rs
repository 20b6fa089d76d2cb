use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    errors::AppError,
    models::restaurant::Menu,
    responses::JsonResponse,
    routes::{auth::session::AuthSession, parse_id, DateQuery},
    state::AppState,
};

/// Menus for `?date=` (today when absent) with their vote counts, most
/// voted first.
pub async fn list_votes(
    State(app_state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<Menu>>, AppError> {
    let date = query.or_today()?;
    Ok(Json(app_state.votes.votes_by_date(date).await?))
}

pub async fn cast_vote(
    State(app_state): State<AppState>,
    session: AuthSession,
    Path((restaurant_id, menu_id)): Path<(String, String)>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = session.user_id()?;
    let restaurant_id = parse_id(&restaurant_id)?;
    let menu_id = parse_id(&menu_id)?;
    let date = query.parse()?;

    app_state
        .votes
        .cast_vote(user_id, restaurant_id, menu_id, date)
        .await?;

    Ok(JsonResponse::created("vote accepted"))
}
