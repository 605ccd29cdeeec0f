use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{
    column::{Column, CreateColumn, UpdateColumn},
    user::User,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn create_column(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateColumn>,
) -> Result<ResponseJson<ApiResponse<Column>>, ApiError> {
    let column = state.columns().create(&payload, &user)?;
    Ok(ResponseJson(ApiResponse::success(column)))
}

/// The path id names the board here; listing and per-column mutation share
/// the `/columns/{id}` shape.
pub async fn get_columns(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Column>>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(
        state.columns().list(board_id),
    )))
}

pub async fn update_column(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(column_id): Path<Uuid>,
    Json(payload): Json<UpdateColumn>,
) -> Result<ResponseJson<ApiResponse<Column>>, ApiError> {
    let column = state.columns().update(column_id, &payload, &user)?;
    Ok(ResponseJson(ApiResponse::success(column)))
}

pub async fn delete_column(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(column_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.columns().delete(column_id, &user)?;
    Ok(ResponseJson(ApiResponse::success_message(
        "Column deleted successfully",
    )))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", post(create_column))
        .route(
            "/{id}",
            get(get_columns).put(update_column).delete(delete_column),
        );

    Router::new().nest("/columns", inner)
}
