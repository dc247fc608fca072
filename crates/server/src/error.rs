use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// A single failed field check, as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth Errors
    #[error("invalid email or password")]
    LoginFail,
    #[error("no auth token found")]
    AuthFailNoToken,
    #[error("auth token wrong format")]
    AuthFailTokenWrongFormat,
    #[error("auth token rejected")]
    AuthFailInvalidToken,
    #[error("auth context missing from request")]
    AuthFailCtxNotInRequestExt,
    #[error("user {user_id} does not own post {post_id}")]
    PostNotOwned { post_id: String, user_id: String },

    // Model Errors
    #[error("email already registered")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("post {id} not found")]
    PostNotFound { id: String },

    // Request Errors
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("upload exceeds the size limit")]
    UploadTooLarge,

    // Generic
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::LoginFail => (StatusCode::UNAUTHORIZED, "Invalid email or password"),
            Error::AuthFailNoToken
            | Error::AuthFailTokenWrongFormat
            | Error::AuthFailInvalidToken
            | Error::PostNotOwned { .. } => (StatusCode::FORBIDDEN, "No access"),
            Error::EmailTaken => (StatusCode::CONFLICT, "Email already registered"),
            Error::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            Error::PostNotFound { .. } => (StatusCode::NOT_FOUND, "Post not found"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            Error::UploadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "File too large"),
            Error::AuthFailCtxNotInRequestExt | Error::Database(_) | Error::Internal(_) => {
                error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = match &self {
            Error::Validation(fields) => json!({
                "error": {
                    "message": message,
                    "fields": fields,
                }
            }),
            _ => json!({
                "error": {
                    "message": message
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Error::EmailTaken;
            }
            if db_err.is_foreign_key_violation() {
                return Error::UserNotFound;
            }
        }
        Error::Database(err)
    }
}

/// Flatten validator output into client-facing field errors, sorted by field
pub fn field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::Validation(field_errors(&errors))
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error::Internal(format!("password hashing failed: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Internal(format!("token signing failed: {err}"))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (Error::LoginFail, StatusCode::UNAUTHORIZED),
            (Error::AuthFailNoToken, StatusCode::FORBIDDEN),
            (Error::EmailTaken, StatusCode::CONFLICT),
            (
                Error::PostNotFound { id: "x".into() },
                StatusCode::NOT_FOUND,
            ),
            (Error::Validation(vec![]), StatusCode::BAD_REQUEST),
            (Error::UploadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (Error::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = Error::Internal("connection refused at 10.0.0.3".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "Internal server error");
    }
}
