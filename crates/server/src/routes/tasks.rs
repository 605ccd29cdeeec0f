use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    task::{CreateTask, Task, TaskWithUsers, TimerStatus, UpdateTask},
    user::User,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<TaskWithUsers>>, ApiError> {
    tracing::debug!(
        "Creating task '{}' on board {}",
        payload.title,
        payload.board_id
    );
    let task = state.tasks().create(&payload, &user)?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// The path id names the board here; listing and per-task mutation share the
/// `/tasks/{id}` shape.
pub async fn get_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(board_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskWithUsers>>>, ApiError> {
    let tasks = state.tasks().list(board_id, &user)?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<TaskWithUsers>>, ApiError> {
    let task = state.tasks().update(task_id, &payload, &user)?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.tasks().delete(task_id, &user)?;
    Ok(ResponseJson(ApiResponse::success_message(
        "Task Deleted Successfully",
    )))
}

pub async fn start_timer(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = state.tasks().start_timer(task_id, &user)?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn stop_timer(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = state.tasks().stop_timer(task_id, &user)?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn get_timer_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<TimerStatus>>, ApiError> {
    let status = state.tasks().timer_status(task_id)?;
    Ok(ResponseJson(ApiResponse::success(status)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", post(create_task))
        .route(
            "/{id}",
            get(get_tasks).put(update_task).delete(delete_task),
        )
        .route("/{id}/start-timer", post(start_timer))
        .route("/{id}/stop-timer", post(stop_timer))
        .route("/{id}/timer", get(get_timer_status));

    Router::new().nest("/tasks", inner)
}
