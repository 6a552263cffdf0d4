//! Batched market classification
//!
//! Markets are classified in fixed-size batches. Requests within a batch
//! run concurrently and the batch is joined before the next one starts,
//! with a fixed pause in between to stay under provider rate limits.

use edge_classifier::{Classifier, SchemaVersion, SignalValidator};
use edge_core::{AgentConfig, AnalyzedMarket, MarketRecord};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// Markets classified per run; the rest are ignored
    pub analyze_limit: usize,
    pub schema: SchemaVersion,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_delay: Duration::from_millis(500),
            analyze_limit: 20,
            schema: SchemaVersion::Strict,
        }
    }
}

impl From<&AgentConfig> for AnalyzerConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            batch_size: config.classifier.batch_size.max(1),
            batch_delay: config.classifier.batch_delay,
            analyze_limit: config.analyze_limit,
            schema: SchemaVersion::from_strict(config.classifier.strict_schema),
        }
    }
}

/// Counts and survivors of one analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    /// Validated markets in input order
    pub analyzed: Vec<AnalyzedMarket>,
    pub attempted: usize,
    /// Classifier call failed
    pub failed: usize,
    /// Classifier answered but validation rejected the signal
    pub rejected: usize,
}

impl AnalysisReport {
    pub fn tradeable(&self) -> usize {
        self.analyzed.iter().filter(|a| a.signal.trade).count()
    }
}

enum Classified {
    Valid(Box<AnalyzedMarket>),
    Failed,
    Rejected,
}

pub struct Analyzer {
    classifier: Arc<dyn Classifier>,
    validator: SignalValidator,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(classifier: Arc<dyn Classifier>, config: AnalyzerConfig) -> Self {
        Self {
            classifier,
            validator: SignalValidator::new(config.schema),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Classify and validate up to `analyze_limit` markets
    pub async fn analyze(&self, markets: &[MarketRecord]) -> AnalysisReport {
        let to_analyze = &markets[..markets.len().min(self.config.analyze_limit)];
        let batch_size = self.config.batch_size.max(1);
        let batches = to_analyze.len().div_ceil(batch_size);

        info!(
            "Analyzing {} markets in {} batch(es) of up to {}",
            to_analyze.len(),
            batches,
            batch_size
        );

        let mut report = AnalysisReport {
            attempted: to_analyze.len(),
            ..Default::default()
        };

        for (index, batch) in to_analyze.chunks(batch_size).enumerate() {
            let results = join_all(batch.iter().map(|market| self.classify_one(market))).await;

            for result in results {
                match result {
                    Classified::Valid(analyzed) => report.analyzed.push(*analyzed),
                    Classified::Failed => report.failed += 1,
                    Classified::Rejected => report.rejected += 1,
                }
            }

            if index + 1 < batches {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        info!(
            "Analyzed {} | valid {} | tradeable {} | failed {} | rejected {}",
            report.attempted,
            report.analyzed.len(),
            report.tradeable(),
            report.failed,
            report.rejected
        );

        report
    }

    async fn classify_one(&self, market: &MarketRecord) -> Classified {
        let raw = match self.classifier.classify(market).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(slug = %market.slug, "Classification failed: {}", e);
                return Classified::Failed;
            }
        };

        match self.validator.validate(&raw) {
            Ok(signal) => {
                debug!(
                    slug = %market.slug,
                    "Signal: trade={} action={} confidence={}",
                    signal.trade,
                    signal.action,
                    signal.confidence
                );
                Classified::Valid(Box::new(AnalyzedMarket::new(market.clone(), signal)))
            }
            Err(reason) => {
                warn!(slug = %market.slug, "Discarding invalid signal: {}", reason);
                Classified::Rejected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edge_classifier::RawSignal;
    use edge_core::{EdgeError, EdgeResult};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    fn market(id: &str) -> MarketRecord {
        MarketRecord {
            id: id.to_string(),
            question: format!("{}?", id),
            slug: id.to_string(),
            volume_24h: dec!(10000),
            liquidity: dec!(10000),
            outcome_prices: Some(r#"["0.6","0.4"]"#.to_string()),
            active: true,
            closed: false,
            accepting_orders: None,
        }
    }

    /// Answers by slug prefix: `fail-*` errors, `bad-*` returns a string
    /// `trade`, anything else a valid signal. Tracks peak concurrency.
    #[derive(Default)]
    struct ScriptedClassifier {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Classifier for ScriptedClassifier {
        async fn classify(&self, market: &MarketRecord) -> EdgeResult<RawSignal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if market.slug.starts_with("fail") {
                return Err(EdgeError::classifier("rate limited"));
            }
            let trade = if market.slug.starts_with("bad") {
                json!("yes")
            } else {
                json!(true)
            };
            Ok(RawSignal::new(json!({
                "trade": trade,
                "action": "YES",
                "confidence": 70,
                "reasoning": "test",
                "defiActions": []
            })))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_are_bounded_and_paused() {
        let classifier = Arc::new(ScriptedClassifier::default());
        let analyzer = Analyzer::new(classifier.clone(), AnalyzerConfig::default());
        let markets: Vec<_> = (0..12).map(|i| market(&format!("m{}", i))).collect();

        let start = Instant::now();
        let report = analyzer.analyze(&markets).await;

        assert_eq!(report.analyzed.len(), 12);
        assert_eq!(classifier.peak.load(Ordering::SeqCst), 5);
        // 3 batches: two pauses between them plus 10ms of work each
        assert!(start.elapsed() >= Duration::from_millis(1030));
        assert!(start.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_failures_and_order() {
        let classifier = Arc::new(ScriptedClassifier::default());
        let config = AnalyzerConfig {
            analyze_limit: 4,
            ..Default::default()
        };
        let analyzer = Analyzer::new(classifier.clone(), config);
        let markets = vec![
            market("a"),
            market("fail-b"),
            market("bad-c"),
            market("d"),
            market("e"),
        ];

        let report = analyzer.analyze(&markets).await;

        assert_eq!(classifier.calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.attempted, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.rejected, 1);
        let slugs: Vec<_> = report.analyzed.iter().map(|a| a.market.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "d"]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let analyzer = Analyzer::new(
            Arc::new(ScriptedClassifier::default()),
            AnalyzerConfig::default(),
        );
        let report = analyzer.analyze(&[]).await;
        assert_eq!(report.attempted, 0);
        assert!(report.analyzed.is_empty());
    }
}
