use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::password::CredentialError;
use crate::repo::RepoError;

pub const USER_NOT_FOUND: &str = "No user found with this id";
pub const POST_NOT_FOUND: &str = "No post found with this id";
pub const UNKNOWN_EMAIL: &str = "No user with that email address!";
pub const WRONG_PASSWORD: &str = "Incorrect password!";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    /// Failed login. Same status class for every cause, message differs.
    #[error("{0}")]
    LoginFailed(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    /// Body that axum could not extract as JSON. Keeps axum's status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(e) => ApiError::BadRequest(e.to_string()),
            e @ RepoError::UniqueViolation { .. } => ApiError::Conflict(e.to_string()),
            e @ RepoError::ForeignKeyViolation { .. } => ApiError::BadRequest(e.to_string()),
            e @ (RepoError::UnhashedPassword
            | RepoError::Credential(_)
            | RepoError::Database(_)) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::LoginFailed(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Rejected { status, message } => (status, message),
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationError;

    #[test]
    fn repo_errors_map_to_client_or_server_class() {
        let bad: ApiError = RepoError::Validation(ValidationError::TooShort {
            field: "password",
            min: 4,
        })
        .into();
        assert!(matches!(bad, ApiError::BadRequest(_)));

        let dup: ApiError = RepoError::UniqueViolation {
            table: "user".into(),
            column: "email".into(),
        }
        .into();
        assert!(matches!(dup, ApiError::Conflict(ref m) if m == "email must be unique"));

        let db: ApiError = RepoError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(db, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn internal_detail_is_not_echoed() {
        let response = ApiError::Internal("connection refused at 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }

    #[tokio::test]
    async fn not_found_body_shape() {
        let response = ApiError::NotFound(USER_NOT_FOUND).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn rejection_keeps_status_and_message_shape() {
        let response = ApiError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "invalid type: integer, expected a string".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "invalid type: integer, expected a string");
    }
}
