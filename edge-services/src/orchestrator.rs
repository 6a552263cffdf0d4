//! Cycle orchestrator
//!
//! One cycle runs Fetch -> Filter -> Classify -> Rank -> Publish. Failures
//! abort at most the current cycle; single classification or publish
//! failures are logged and skipped. The scheduler runs one cycle at start
//! and then on a fixed interval, never overlapping two cycles.

use crate::analyzer::Analyzer;
use crate::ranker::pick_top;
use crate::simulator::DefiSimulator;
use chrono::{DateTime, Utc};
use edge_core::{AgentConfig, AnalyzedMarket, PublishRequest};
use edge_ledger::LedgerWriter;
use edge_polymarket::{MarketFilter, MarketSource};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Where the orchestrator currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    Fetching,
    Filtering,
    Classifying,
    Ranking,
    Publishing,
    CycleFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// No market survived fetch + filter
    NothingToDo,
    /// Markets were classified but none cleared the ranker
    NoSignals,
    /// At least one signal reached the publish step
    Completed,
    /// Another cycle was still running
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishedTx {
    pub market_slug: String,
    pub tx_hash: String,
    pub explorer_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: CycleOutcome,
    pub fetched: usize,
    pub filtered: usize,
    pub classified: usize,
    pub tradeable: usize,
    pub selected: usize,
    pub published: Vec<PublishedTx>,
    pub publish_failures: usize,
    pub error: Option<String>,
}

impl CycleReport {
    fn new(cycle: u64) -> Self {
        Self {
            cycle,
            started_at: Utc::now(),
            finished_at: None,
            outcome: CycleOutcome::Completed,
            fetched: 0,
            filtered: 0,
            classified: 0,
            tradeable: 0,
            selected: 0,
            published: Vec::new(),
            publish_failures: 0,
            error: None,
        }
    }

    fn finish(mut self, outcome: CycleOutcome) -> Self {
        self.outcome = outcome;
        self.finished_at = Some(Utc::now());
        self
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub fetch_limit: u32,
    pub top_n: usize,
    pub confidence_threshold: f64,
    pub cycle_interval: Duration,
    pub explorer_tx_url: String,
}

impl From<&AgentConfig> for OrchestratorSettings {
    fn from(config: &AgentConfig) -> Self {
        Self {
            fetch_limit: config.fetch_limit,
            top_n: config.top_n,
            confidence_threshold: config.confidence_threshold,
            cycle_interval: config.cycle_interval,
            explorer_tx_url: config.ledger.explorer_tx_url.clone(),
        }
    }
}

pub struct Orchestrator {
    source: Arc<dyn MarketSource>,
    filter: MarketFilter,
    analyzer: Analyzer,
    writer: Arc<dyn LedgerWriter>,
    simulator: DefiSimulator,
    settings: OrchestratorSettings,
    state: RwLock<CycleState>,
    last_report: RwLock<Option<CycleReport>>,
    running: AtomicBool,
    cycles: AtomicU64,
}

/// Releases the running flag even if the cycle panics
struct RunGuard<'a> {
    orchestrator: &'a Orchestrator,
    finished: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.orchestrator.state.write() = CycleState::CycleFailed;
        }
        self.orchestrator.running.store(false, Ordering::SeqCst);
    }
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn MarketSource>,
        filter: MarketFilter,
        analyzer: Analyzer,
        writer: Arc<dyn LedgerWriter>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            source,
            filter,
            analyzer,
            writer,
            simulator: DefiSimulator,
            settings,
            state: RwLock::new(CycleState::Idle),
            last_report: RwLock::new(None),
            running: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> CycleState {
        *self.state.read()
    }

    pub fn last_report(&self) -> Option<CycleReport> {
        self.last_report.read().clone()
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    fn enter(&self, state: CycleState) {
        *self.state.write() = state;
    }

    /// Run one full cycle unless another is already running
    pub async fn run_cycle(&self) -> CycleReport {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Previous cycle still running, skipping");
            return CycleReport::new(self.cycles_started()).finish(CycleOutcome::Skipped);
        }

        let mut guard = RunGuard {
            orchestrator: self,
            finished: false,
        };

        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Cycle {} starting", cycle);

        let report = self.execute(CycleReport::new(cycle)).await;
        *self.last_report.write() = Some(report.clone());
        self.enter(CycleState::Idle);
        guard.finished = true;

        info!(
            "Cycle {} finished: {:?} | fetched {} | filtered {} | classified {} | selected {} | published {}",
            cycle,
            report.outcome,
            report.fetched,
            report.filtered,
            report.classified,
            report.selected,
            report.published.len()
        );
        report
    }

    async fn execute(&self, mut report: CycleReport) -> CycleReport {
        self.enter(CycleState::Fetching);
        let markets = match self.source.fetch_markets(self.settings.fetch_limit).await {
            Ok(markets) => markets,
            Err(e) => {
                warn!("Market fetch failed, treating as empty: {}", e);
                Vec::new()
            }
        };
        report.fetched = markets.len();

        self.enter(CycleState::Filtering);
        let filtered = self.filter.apply(markets);
        report.filtered = filtered.len();
        info!("Fetched {} | after filter {}", report.fetched, report.filtered);

        if filtered.is_empty() {
            info!("No markets pass the filter, nothing to do");
            return report.finish(CycleOutcome::NothingToDo);
        }

        self.enter(CycleState::Classifying);
        let analysis = self.analyzer.analyze(&filtered).await;
        report.classified = analysis.analyzed.len();
        report.tradeable = analysis.tradeable();

        self.enter(CycleState::Ranking);
        let selected = pick_top(
            &analysis.analyzed,
            self.settings.top_n,
            self.settings.confidence_threshold,
        );
        report.selected = selected.len();

        if selected.is_empty() {
            info!(
                "No signals at or above {} confidence this cycle",
                self.settings.confidence_threshold
            );
            return report.finish(CycleOutcome::NoSignals);
        }

        self.enter(CycleState::Publishing);
        for analyzed in &selected {
            self.log_signal(analyzed);
            self.simulator.run(&analyzed.signal.defi_actions);

            let request = PublishRequest::from_analyzed(analyzed);
            match self.writer.publish(&request).await {
                Ok(receipt) => {
                    let explorer_url = format!("{}{}", self.settings.explorer_tx_url, receipt.tx_hash);
                    info!(slug = %request.market_slug, "Published strategy: {}", explorer_url);
                    report.published.push(PublishedTx {
                        market_slug: request.market_slug.clone(),
                        tx_hash: receipt.tx_hash,
                        explorer_url,
                    });
                }
                Err(e) => {
                    error!(slug = %request.market_slug, "Publish failed, moving on: {}", e);
                    report.publish_failures += 1;
                }
            }
        }

        report.finish(CycleOutcome::Completed)
    }

    fn log_signal(&self, analyzed: &AnalyzedMarket) {
        let s = &analyzed.signal;
        info!(
            slug = %analyzed.market.slug,
            "{} | probability {}% | confidence {} | {} ({} risk) | target {}",
            analyzed.market.question,
            analyzed.probability.round_dp(1),
            s.confidence,
            s.strategy_type,
            s.risk_level,
            s.target_return
        );
        info!(slug = %analyzed.market.slug, "Macro: {}", s.macro_implication);
        info!(slug = %analyzed.market.slug, "Strategy: {}", s.strategy_description);
    }

    /// Run a cycle now and then every `cycle_interval`, forever
    ///
    /// Each cycle runs in its own task so a panic is reported as a failed
    /// cycle instead of stopping the scheduler.
    pub async fn run_forever(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.settings.cycle_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let this = Arc::clone(&self);
            match tokio::spawn(async move { this.run_cycle().await }).await {
                Ok(_) => {}
                Err(e) => {
                    error!("Cycle task aborted: {}", e);
                    let mut report =
                        CycleReport::new(self.cycles_started()).finish(CycleOutcome::Failed);
                    report.error = Some(e.to_string());
                    *self.last_report.write() = Some(report);
                }
            }

            info!(
                "Next cycle in {}s",
                self.settings.cycle_interval.as_secs()
            );
        }
    }
}
