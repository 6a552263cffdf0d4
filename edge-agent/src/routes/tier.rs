//! Holder tier lookup

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use edge_ledger::parse_address;
use tracing::{error, info};

use super::ErrorResponse;
use crate::AppState;

/// Create tier routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/tier/{address}", get(get_tier))
}

async fn get_tier(State(state): State<AppState>, Path(address): Path<String>) -> impl IntoResponse {
    let holder = match parse_address("holder", &address) {
        Ok(holder) => holder,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    match state.access.tier_of(holder).await {
        Ok(tier) => {
            info!("Tier for {}: {}", holder, tier.info.tier);
            (StatusCode::OK, Json(tier)).into_response()
        }
        Err(e) => {
            error!("Failed to read tier for {}: {}", holder, e);
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
