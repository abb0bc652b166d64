use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::category::CategoryError;
use crate::classifier::ModelError;
use crate::models::ApiResponse;
use crate::preprocess::PreprocessError;

/// Everything a request can fail with. Rendering is left to `ResponseError`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error("Error making prediction: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("Error making prediction: {0}")]
    Model(#[from] ModelError),

    #[error("Please log in first.")]
    Unauthorized,

    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,

    #[error("{0}")]
    BadRequest(String),

    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Category(_) | AppError::Preprocess(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Model(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::error(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let invalid: AppError = CategoryError::Invalid("Covid".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::PayloadTooLarge(10).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        let model: AppError = ModelError::Output("empty".into()).into();
        assert_eq!(model.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn prediction_failures_read_like_the_ui_message() {
        let err: AppError = PreprocessError::UnsupportedFormat("Gif".into()).into();
        assert_eq!(
            err.to_string(),
            "Error making prediction: unsupported image format: Gif"
        );
    }
}
