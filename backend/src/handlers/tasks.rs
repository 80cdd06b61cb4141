use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use planner_shared::api::{CreateTaskRequest, UpdateTaskRequest};
use planner_shared::Task;
use validator::Validate;

use super::parse_id;
use crate::auth::AuthUser;
use crate::db::tasks;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = tasks::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task = tasks::get_for_user(&state.pool, user.user_id, parse_id(&id)?).await?;
    Ok(Json(task))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(payload) = payload?;
    payload.validate()?;

    let task = tasks::create(&state.pool, user.user_id, payload).await?;
    state.notifier.announce();
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    payload.validate()?;

    let task = tasks::update(&state.pool, user.user_id, id, payload).await?;
    state.notifier.announce();
    Ok(Json(task))
}

/// Always answers `Deleted`, whether or not a row was removed.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<&'static str> {
    let id = parse_id(&id)?;

    let removed = tasks::delete(&state.pool, user.user_id, id).await?;
    tracing::debug!("Deleted {} task row(s) for id {}", removed, id);
    if removed > 0 {
        state.notifier.announce();
    }

    Ok("Deleted")
}
