use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use db::models::board::Board;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Loads the board named in the path and stashes it as a request extension,
/// so handlers behind this layer can take `Extension<Board>` directly.
pub async fn load_board_middleware(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let board = Board::find_by_id(&state.db().store, board_id).ok_or_else(|| {
        tracing::warn!(%board_id, "Board not found");
        ApiError::NotFound("Board not found".to_string())
    })?;
    request.extensions_mut().insert(board);
    Ok(next.run(request).await)
}
