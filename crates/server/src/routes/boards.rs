use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::{
    board::{Board, BoardWithCreator, CreateBoard, UpdateBoard},
    user::User,
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::load_board_middleware};

pub async fn get_boards(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<Vec<BoardWithCreator>>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(
        state.boards().list_for_user(user.id),
    )))
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateBoard>,
) -> Result<ResponseJson<ApiResponse<Board>>, ApiError> {
    tracing::debug!("Creating board '{}'", payload.name);
    let board = state.boards().create(&payload, &user)?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

pub async fn update_board(
    Extension(board): Extension<Board>,
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateBoard>,
) -> Result<ResponseJson<ApiResponse<Board>>, ApiError> {
    let board = state.boards().update(board, &payload, &user)?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

pub async fn delete_board(
    Extension(board): Extension<Board>,
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.boards().delete(board, &user)?;
    Ok(ResponseJson(ApiResponse::success_message(
        "Board deleted successfully",
    )))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let board_id_router = Router::new()
        .route("/", put(update_board).delete(delete_board))
        .layer(from_fn_with_state(state.clone(), load_board_middleware));

    let inner = Router::new()
        .route("/", get(get_boards).post(create_board))
        .nest("/{board_id}", board_id_router);

    Router::new().nest("/boards", inner)
}
