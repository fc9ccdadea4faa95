use crate::api::api_error::APIError;
use crate::api::model::{AskQuery, AskResult};
use crate::api::server::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/ask", get(ask))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn ask(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AskQuery>, APIError>,
) -> Result<Json<AskResult>, APIError> {
    if query.domain.is_empty() {
        return Err(APIError::EmptyDomain);
    }

    match state.permission.certificate_allowed(&query.domain).await {
        Ok(()) => {
            tracing::info!("allowed certificate for \"{}\"", query.domain);
            Ok(Json(AskResult {
                domain: query.domain,
            }))
        }
        Err(err) => {
            tracing::info!("refused certificate for \"{}\": {err}", query.domain);
            Err(err.into())
        }
    }
}
