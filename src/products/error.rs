use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// The single failure kind of the product service; the message tells cases apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct BadRequest(pub String);

impl BadRequest {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Wraps a store fault under an operation prefix, e.g. `Failed to add product: <cause>`.
    pub fn wrap(prefix: &str, cause: anyhow::Error) -> Self {
        Self(format!("{prefix}: {cause}"))
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.0).into_response()
    }
}
