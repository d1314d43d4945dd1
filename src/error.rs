//! Request-level error type and its HTTP mapping.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

// ---

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// Bad client input; the request is not executed.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The reading store could not be reached or the query failed.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl AdvisorError {
    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            AdvisorError::Validation(_) => StatusCode::BAD_REQUEST,
            AdvisorError::NotFound(_) => StatusCode::NOT_FOUND,
            AdvisorError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AdvisorError {
    fn from(rejection: JsonRejection) -> Self {
        AdvisorError::Validation(format!("corpo JSON inválido: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AdvisorError {
    fn from(rejection: QueryRejection) -> Self {
        AdvisorError::Validation(format!("parâmetros inválidos: {}", rejection.body_text()))
    }
}

impl IntoResponse for AdvisorError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "erro interno".to_string()
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
