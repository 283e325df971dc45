use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;
use crate::leave::{LeaveError, LeaveErrorKind};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),

    #[error(transparent)]
    Leave(#[from] LeaveError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Leave(error) => match error.kind() {
                LeaveErrorKind::Validation | LeaveErrorKind::BusinessRule => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                LeaveErrorKind::Conflict => StatusCode::CONFLICT,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!(
                "Request failed with status {}: {}",
                status_code,
                error_message
            );
        } else {
            log::warn!(
                "Request refused with status {}: {}",
                status_code,
                error_message
            );
        }

        match self {
            AppError::Leave(error) => HttpResponse::build(status_code).json(
                ApiResponse::rejected(error.field(), error.code(), error_message),
            ),
            _ => HttpResponse::build(status_code).json(ApiResponse::<()>::error(error_message)),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}

impl AppError {
    pub fn internal_server_error_message(message: impl Into<String>) -> Self {
        AppError::InternalServerError(Some(message.into()))
    }

    pub fn balance_conflict() -> Self {
        AppError::Conflict(
            "The balance changed while this request was processed. Please retry.".to_string(),
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Keep sqlx errors typed so they still render as database failures
        match error.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => {
                log::error!("Database error: {}", sqlx_err);
                AppError::DatabaseError(sqlx_err)
            }
            Err(original_error) => {
                log::error!("Anyhow error: {}", original_error);
                AppError::InternalServerError(Some(original_error.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::Days;
    use pretty_assertions::assert_eq;

    #[test]
    fn leave_errors_map_to_unprocessable_or_conflict() {
        let insufficient = AppError::from(LeaveError::InsufficientBalance {
            remaining: Days::whole(4),
            requested: Days::whole(6),
        });
        assert_eq!(insufficient.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            insufficient.to_string(),
            "Insufficient annual leave balance. You have 4 days remaining, but requested 6 days."
        );

        assert_eq!(
            AppError::from(LeaveError::EmptyRange { half_day: false }).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(LeaveError::OverlappingRequest).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::balance_conflict().status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn anyhow_wrapped_sqlx_errors_stay_database_errors() {
        let error = AppError::from(anyhow::Error::new(sqlx::Error::RowNotFound));
        assert!(matches!(error, AppError::DatabaseError(_)));

        let error = AppError::from(anyhow::anyhow!("boom"));
        assert_eq!(error.to_string(), "Internal server error: boom");
    }
}
