use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::StoreError;
use services::services::{
    board::BoardServiceError, column::ColumnServiceError, task::TaskServiceError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Board(#[from] BoardServiceError),
    #[error(transparent)]
    Column(#[from] ColumnServiceError),
    #[error(transparent)]
    Task(#[from] TaskServiceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Board(err) => match err {
                BoardServiceError::BoardNotFound => (StatusCode::NOT_FOUND, "BoardError"),
                BoardServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "BoardError"),
                BoardServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "BoardError"),
                BoardServiceError::Store(store_err) => (store_status(store_err), "BoardError"),
            },
            ApiError::Column(err) => match err {
                ColumnServiceError::ColumnNotFound => (StatusCode::NOT_FOUND, "ColumnError"),
                ColumnServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "ColumnError"),
                ColumnServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "ColumnError"),
                ColumnServiceError::Store(store_err) => (store_status(store_err), "ColumnError"),
            },
            ApiError::Task(err) => match err {
                TaskServiceError::MissingFields => (StatusCode::BAD_REQUEST, "TaskError"),
                TaskServiceError::TaskNotFound
                | TaskServiceError::BoardNotFound
                | TaskServiceError::AssigneeNotFound(_) => (StatusCode::NOT_FOUND, "TaskError"),
                TaskServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "TaskError"),
                TaskServiceError::Store(store_err) => (store_status(store_err), "TaskError"),
            },
            ApiError::Store(store_err) => (store_status(store_err), "StoreError"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "ForbiddenError"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        let error_message = match &self {
            ApiError::Board(err) => err.to_string(),
            ApiError::Column(err) => err.to_string(),
            ApiError::Task(err) => err.to_string(),
            ApiError::Store(err) => err.to_string(),
            ApiError::Unauthorized => "Unauthorized. Please sign in again.".to_string(),
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Internal(msg) => msg.clone(),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::RecordNotFound(_) => StatusCode::NOT_FOUND,
    }
}
