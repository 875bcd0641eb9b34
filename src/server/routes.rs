use crate::orchestrator::Orchestrator;
use crate::server::error::ApiError;
use axum::extract::{Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct ComplianceQuery {
    #[serde(default)]
    pub policy: String,
    #[serde(default, alias = "target")]
    pub webpage: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComplianceResponse {
    #[serde(rename = "Response")]
    pub response: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/compliance", post(analyze))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<ComplianceQuery>,
) -> Result<Json<ComplianceResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .handle_request(&query.policy, &query.webpage)
        .await?;
    info!(
        "Compliance {} ({} findings, cache_hit={})",
        outcome.cache_key,
        outcome.findings.len(),
        outcome.cache_hit
    );
    Ok(Json(ComplianceResponse {
        response: outcome.response_text(),
    }))
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    info!("--> {} {}", method, path);
    let response = next.run(request).await;
    info!("<-- {} {} {}", method, path, response.status());
    response
}
