use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use planner_shared::api::{CreateEventRequest, UpdateEventRequest};
use planner_shared::Event;
use validator::Validate;

use super::parse_id;
use crate::auth::AuthUser;
use crate::db::events;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_events(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = events::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    let event = events::get_for_user(&state.pool, user.user_id, parse_id(&id)?).await?;
    Ok(Json(event))
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let Json(payload) = payload?;
    payload.validate()?;

    let event = events::create(&state.pool, user.user_id, payload).await?;
    state.notifier.announce();
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> ApiResult<Json<Event>> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    payload.validate()?;

    let event = events::update(&state.pool, user.user_id, id, payload).await?;
    state.notifier.announce();
    Ok(Json(event))
}

/// Always answers `Deleted`, whether or not a row was removed.
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<&'static str> {
    let id = parse_id(&id)?;

    let removed = events::delete(&state.pool, user.user_id, id).await?;
    tracing::debug!("Deleted {} event row(s) for id {}", removed, id);
    if removed > 0 {
        state.notifier.announce();
    }

    Ok("Deleted")
}
