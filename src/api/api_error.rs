use crate::error::Error;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub(crate) enum APIError {
    Permission(Error),
    Query(QueryRejection),
    EmptyDomain,
}

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            APIError::Permission(err) => {
                let status = match &err {
                    Error::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                    Error::ResolutionFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            APIError::Query(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            APIError::EmptyDomain => (
                StatusCode::BAD_REQUEST,
                "domain must not be empty".to_string(),
            ),
        };
        let body = Json(json!({
            "error": message,
        }));
        (status, body).into_response()
    }
}

impl From<Error> for APIError {
    fn from(err: Error) -> Self {
        Self::Permission(err)
    }
}

impl From<QueryRejection> for APIError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Query(rejection)
    }
}
