use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Every failure a handler, store or collaborator can report.
///
/// The HTTP status lives here; the response body is shaped by
/// [`crate::middleware::ErrorTranslator`] according to the configured mode.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("JSON Web Token is invalid. Try Again!!!")]
    InvalidToken,

    #[error("JSON Web Token is expired. Try Again!!!")]
    ExpiredToken,

    #[error("{0}")]
    Forbidden(String),

    /// Duplicate unique field. The original API answers 400, not 409.
    #[error("Duplicate field value: {0}. Please use another value!")]
    Conflict(String),

    #[error("You have already delivered this order")]
    AlreadyDelivered,

    #[error("Insufficient stock for product: {0}")]
    InsufficientStock(String),

    /// Email or image host call failed.
    #[error("{0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn order_not_found() -> Self {
        AppError::NotFound("No Order found with this ID".to_string())
    }

    pub fn product_not_found() -> Self {
        AppError::NotFound("Product not found".to_string())
    }

    pub fn invalid_id() -> Self {
        AppError::Validation("Resource not found. Invalid: _id".to_string())
    }

    /// Errors whose message is safe to show in terse mode.
    pub fn is_public(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Conflict(_)
            | AppError::AlreadyDelivered
            | AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) | AppError::InvalidToken | AppError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Upstream(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_public() {
            self.to_string()
        } else {
            "Internal Server Error".to_string()
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": message
        }))
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        AppError::Internal(format!("Failed to encode document: {}", e))
    }
}

/// Rejects ids that are not 24-hex ObjectIds before they reach the store.
pub fn parse_object_id(id: &str) -> Result<String, AppError> {
    mongodb::bson::oid::ObjectId::parse_str(id)
        .map(|oid| oid.to_hex())
        .map_err(|_| AppError::invalid_id())
}

/// MongoDB duplicate key (E11000), raised either as a write or command error.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}
