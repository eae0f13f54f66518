use actix_web::{HttpResponse, ResponseError, http::StatusCode};

/// Every failure a request can surface. The response body is always a
/// short JSON notice so the client can show it as a toast; no variant ends
/// the editing session.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Color, level or logo input that the renderer must not see
    #[error("Rejected configuration: {0}")]
    RejectedConfiguration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Export was asked for while no symbol is rendered
    #[error("Nothing to export: no QR code is currently rendered")]
    NothingToExport,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Authentication required")]
    Unauthenticated { sign_in: String },

    #[error("Remote history unavailable")]
    RemoteUnavailable,

    #[error("QR code generation error: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::RejectedConfiguration(errors.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::RejectedConfiguration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NothingToExport => StatusCode::CONFLICT,
            AppError::SessionNotFound => StatusCode::NOT_FOUND,
            AppError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            AppError::RemoteUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            // An over-long payload is the user's input, not a server fault
            AppError::Encode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Image(_)
            | AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Unauthenticated { sign_in } => serde_json::json!({
                "error": self.to_string(),
                "sign_in": sign_in,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_export_is_a_conflict() {
        assert_eq!(AppError::NothingToExport.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn unauthenticated_carries_sign_in_path() {
        let err = AppError::Unauthenticated {
            sign_in: "/login".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Authentication required");
    }
}
