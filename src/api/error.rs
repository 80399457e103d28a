use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Every backend failure collapses to a fixed 500 response for its route;
/// the cause is only logged.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request")]
    BadRequest,

    #[error("Upload failed: {0:#}")]
    Upload(anyhow::Error),

    #[error("Retrieval failed: {0:#}")]
    Retrieval(anyhow::Error),

    #[error("Delete failed: {0:#}")]
    Delete(anyhow::Error),

    #[error("Attachment failed: {0:#}")]
    Attachment(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !matches!(self, AppError::BadRequest) {
            tracing::error!("{}", self);
        }

        match self {
            AppError::BadRequest => StatusCode::BAD_REQUEST.into_response(),
            AppError::Upload(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "File upload failed").into_response()
            }
            AppError::Retrieval(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            AppError::Delete(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error while deleting the image",
            )
                .into_response(),
            AppError::Attachment(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve the file",
            )
                .into_response(),
        }
    }
}
