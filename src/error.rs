use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User email is required.")]
    MissingEmail,

    #[error("Text is required")]
    EmptyText,

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Server error. Could not complete the request.")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MissingEmail | AppError::EmptyText | AppError::MalformedPayload => {
                StatusCode::BAD_REQUEST
            }
            AppError::Internal(err) => {
                error!("request failed: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
