use actix_web::{HttpResponse, http::StatusCode};
use derive_more::Display;

/// Error taxonomy surfaced by the request handlers.
///
/// Validation and conflict failures never mutate state; they map to 400
/// responses with a descriptive message, matching the shape the clients
/// already consume.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            other => {
                tracing::error!(error = %other, "database operation failed");
                ApiError::Internal
            }
        }
    }
}

/// MySQL reports duplicate-key inserts as SQLSTATE 23000. Check-in relies on
/// the unique (employee_id, date) key, so concurrent same-day check-ins lose
/// here instead of creating a second record.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        return db_err.code().as_deref() == Some("23000");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_are_descriptive() {
        let e = ApiError::Conflict("Already checked in today".into());
        assert_eq!(e.to_string(), "Already checked in today");
        assert_eq!(ApiError::Internal.to_string(), "Internal Server Error");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let e: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(e, ApiError::NotFound(_)));
    }
}
