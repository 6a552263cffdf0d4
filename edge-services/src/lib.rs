//! Signal pipeline and dashboard access services
//!
//! - [`Analyzer`] classifies filtered markets in rate-limited batches
//! - [`pick_top`] selects the signals worth publishing
//! - [`DefiSimulator`] dry-runs a signal's DeFi actions
//! - [`Orchestrator`] drives the fetch, classify and publish cycle
//! - [`AccessService`] answers tier and feed queries for the dashboard

pub mod access_service;
pub mod analyzer;
pub mod orchestrator;
pub mod ranker;
pub mod simulator;

pub use access_service::{AccessService, FeedItem, FeedStatus, HolderTier, ItemAccess, StrategyFeed};
pub use analyzer::{AnalysisReport, Analyzer, AnalyzerConfig};
pub use orchestrator::{
    CycleOutcome, CycleReport, CycleState, Orchestrator, OrchestratorSettings, PublishedTx,
};
pub use ranker::pick_top;
pub use simulator::{DefiSimulator, ExecutionPlan, SimulatedTx, SimulationReport};
