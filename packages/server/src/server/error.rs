//! HTTP error mapping.
//!
//! Domain outcomes (not found, bad request, unauthorized) carry their own
//! message. Store failures carry the operation's generic message and the
//! underlying error, which is logged but never sent to the client.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::domains::member::PatchError;

/// Error body: `{"message": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Store failure at an operation boundary
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn store(message: &'static str, source: anyhow::Error) -> Self {
        ApiError::Store { message, source }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store { source, .. } => store_status(source),
        }
    }
}

/// HTTP status for a store error
///
/// Constraint and input-format violations are the client's fault; pool
/// exhaustion is temporary. Everything else is a server error.
pub fn store_status(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => match db.code().as_deref() {
            // not_null_violation, check_violation, invalid_text_representation,
            // character_not_in_repertoire, string_data_right_truncation,
            // numeric_value_out_of_range
            Some("23502" | "23514" | "22P02" | "22021" | "22001" | "22003") => {
                StatusCode::BAD_REQUEST
            }
            // unique_violation, foreign_key_violation
            Some("23505" | "23503") => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        Some(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Store { message, source } => {
                error!(status = status.as_u16(), error = ?source, "{}", message);
            }
            other => debug!(status = status.as_u16(), "{}", other),
        }

        let body = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PatchError> for ApiError {
    fn from(err: PatchError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
