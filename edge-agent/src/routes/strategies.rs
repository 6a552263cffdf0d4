//! Published strategy feed and publish stats

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use edge_ledger::parse_address;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::ErrorResponse;
use crate::AppState;

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Query parameters for the strategy feed
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Wallet to evaluate access for; omitted means not connected
    pub holder: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_published: u64,
    pub agent_address: String,
    pub strategy_dao: String,
}

/// Create strategy routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/strategies", get(list_strategies))
        .route("/stats", get(stats))
}

async fn list_strategies(
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> impl IntoResponse {
    debug!("Listing strategies with params: {:?}", params);

    let holder = match params.holder.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match parse_address("holder", raw) {
            Ok(address) => Some(address),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response();
            }
        },
    };

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    match state.access.feed(holder, limit, Utc::now()).await {
        Ok(feed) => (StatusCode::OK, Json(feed)).into_response(),
        Err(e) => {
            error!("Failed to load strategies: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.access.total_published().await {
        Ok(total_published) => (
            StatusCode::OK,
            Json(StatsResponse {
                total_published,
                agent_address: state.agent_address.clone(),
                strategy_dao: state.strategy_dao.clone(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to read strategy count: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
