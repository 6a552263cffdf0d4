//! CrowdEdge signal agent
//!
//! Runs the publish cycle on a fixed interval and serves the read-only
//! dashboard API next to it.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use edge_classifier::LlmClassifier;
use edge_core::AgentConfig;
use edge_ledger::{format_units, MonadLedger, LOW_BALANCE_WEI};
use edge_polymarket::{GammaClient, MarketFilter};
use edge_services::{AccessService, Analyzer, AnalyzerConfig, Orchestrator, OrchestratorSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub access: Arc<AccessService>,
    pub agent_address: String,
    pub strategy_dao: String,
}

fn load_env() {
    for file in [".env", ".env.local"] {
        if let Err(e) = dotenvy::from_filename(file) {
            // Not an error if the file doesn't exist
            if !e.not_found() {
                eprintln!("Warning: Failed to load {}: {}", file, e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,edge_agent=debug")),
        )
        .init();

    info!("Starting CrowdEdge agent");

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Config: threshold {} | top {} | every {}s | model {}",
        config.confidence_threshold,
        config.top_n,
        config.cycle_interval.as_secs(),
        config.classifier.model
    );

    // Ledger
    let ledger = Arc::new(MonadLedger::new(&config.ledger)?);
    info!("Agent wallet: {}", ledger.wallet().address_string());
    info!("StrategyDAO: {}", ledger.dao_address());

    match ledger.check_chain().await {
        Ok(_) => {}
        Err(e) => warn!("Could not verify chain: {}", e),
    }

    match ledger.native_balance().await {
        Ok(balance) => {
            info!("Wallet balance: {} MON", format_units(balance, 4));
            if balance < LOW_BALANCE_WEI {
                warn!("Low balance, publishing may fail. Fund the agent wallet with testnet MON");
            }
        }
        Err(e) => warn!("Could not read wallet balance: {}", e),
    }

    // Pipeline
    let source = Arc::new(GammaClient::new(config.polymarket_api_url.clone())?);
    let classifier = Arc::new(LlmClassifier::new(&config.classifier));
    let analyzer = Analyzer::new(classifier, AnalyzerConfig::from(&config));
    let filter = MarketFilter::default().with_exclude_unpriced(config.exclude_unpriced_markets);

    let orchestrator = Arc::new(Orchestrator::new(
        source,
        filter,
        analyzer,
        ledger.clone(),
        OrchestratorSettings::from(&config),
    ));

    tokio::spawn(orchestrator.clone().run_forever());

    // Dashboard API
    let access = Arc::new(AccessService::new(
        ledger.clone(),
        config.tier_thresholds,
        config.tier_cache_ttl,
    ));

    let state = AppState {
        orchestrator,
        access,
        agent_address: ledger.wallet().address_string(),
        strategy_dao: ledger.dao_address().to_string(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
