use axum::http::StatusCode;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use behlog_core::authorization::AuthzError;
use thiserror::Error;
use tracing::error;

#[derive(Clone, Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient permissions: {0} required")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authorization store unavailable")]
    ServiceUnavailable,

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn get_error_msg(&self) -> (StatusCode, String) {
        let status = match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string())
    }
}

impl From<AuthzError> for AppError {
    fn from(e: AuthzError) -> Self {
        match e {
            AuthzError::RoleNotFound(_)
            | AuthzError::ClaimNotFound { .. }
            | AuthzError::AssignmentNotFound { .. } => AppError::NotFound(e.to_string()),
            AuthzError::RoleAlreadyExists(_) | AuthzError::VersionConflict { .. } => {
                AppError::Conflict(e.to_string())
            }
            AuthzError::UnknownPermission(_) | AuthzError::Validation(_) => {
                AppError::InvalidInput(e.to_string())
            }
            AuthzError::StoreUnavailable(reason) => {
                // the reason may contain file paths, keep it in the log only
                error!("Authorization store unavailable: {}", reason);
                AppError::ServiceUnavailable
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            return app_error.clone();
        }
        AppError::InternalServerError(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.get_error_msg();
        let body = serde_json::json!({ "error": true, "message": body });
        (status, Json(body)).into_response()
    }
}
