//! Selection of the signals worth publishing

use edge_core::AnalyzedMarket;

/// Top `n` actionable signals by confidence
///
/// Keeps signals with `trade == true` and confidence at or above
/// `min_confidence`, sorted by confidence descending. The sort is stable,
/// so ties keep their input order (24h volume order from the data source).
/// An empty result means no action this cycle.
pub fn pick_top(analyzed: &[AnalyzedMarket], n: usize, min_confidence: f64) -> Vec<AnalyzedMarket> {
    let mut eligible: Vec<&AnalyzedMarket> = analyzed
        .iter()
        .filter(|a| a.is_actionable(min_confidence))
        .collect();

    eligible.sort_by(|a, b| b.signal.confidence.total_cmp(&a.signal.confidence));
    eligible.into_iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_core::{Direction, MarketRecord, RiskLevel, ValidatedSignal};
    use rust_decimal_macros::dec;

    fn analyzed(id: &str, trade: bool, confidence: f64) -> AnalyzedMarket {
        let market = MarketRecord {
            id: id.to_string(),
            question: format!("{}?", id),
            slug: id.to_string(),
            volume_24h: dec!(10000),
            liquidity: dec!(10000),
            outcome_prices: None,
            active: true,
            closed: false,
            accepting_orders: None,
        };
        let signal = ValidatedSignal {
            trade,
            action: Direction::Yes,
            confidence,
            reasoning: String::new(),
            strategy_type: "RISK_OFF".to_string(),
            strategy_description: String::new(),
            macro_implication: String::new(),
            risk_level: RiskLevel::Medium,
            target_return: "TBD".to_string(),
            defi_actions: Vec::new(),
        };
        AnalyzedMarket::new(market, signal)
    }

    fn confidences(picked: &[AnalyzedMarket]) -> Vec<f64> {
        picked.iter().map(|a| a.signal.confidence).collect()
    }

    #[test]
    fn test_scenario_b_top_three() {
        let mut input = Vec::new();
        for (i, c) in [66.0, 90.0, 65.0, 80.0, 70.0].iter().enumerate() {
            input.push(analyzed(&format!("hi-{}", i), true, *c));
        }
        for i in 0..15 {
            input.push(analyzed(&format!("lo-{}", i), true, 40.0 + i as f64));
        }

        let picked = pick_top(&input, 3, 65.0);
        assert_eq!(confidences(&picked), vec![90.0, 80.0, 70.0]);
    }

    #[test]
    fn test_excludes_non_trades_and_low_confidence() {
        let input = vec![
            analyzed("no-trade", false, 99.0),
            analyzed("low", true, 64.9),
            analyzed("edge", true, 65.0),
        ];

        let picked = pick_top(&input, 3, 65.0);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].market.id, "edge");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let input = vec![
            analyzed("first", true, 75.0),
            analyzed("top", true, 80.0),
            analyzed("second", true, 75.0),
            analyzed("third", true, 75.0),
        ];

        let picked = pick_top(&input, 3, 65.0);
        let ids: Vec<_> = picked.iter().map(|a| a.market.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "first", "second"]);
    }

    #[test]
    fn test_result_is_bounded_and_sorted() {
        let input: Vec<_> = (0..40)
            .map(|i| analyzed(&i.to_string(), i % 3 != 0, ((i * 37) % 100) as f64))
            .collect();

        for n in [0, 1, 3, 10, 100] {
            let picked = pick_top(&input, n, 65.0);
            assert!(picked.len() <= n);
            assert!(picked.iter().all(|a| a.signal.trade && a.signal.confidence >= 65.0));
            assert!(picked
                .windows(2)
                .all(|w| w[0].signal.confidence >= w[1].signal.confidence));
        }
    }

    #[test]
    fn test_empty_means_no_action() {
        assert!(pick_top(&[], 3, 65.0).is_empty());
        assert!(pick_top(&[analyzed("x", true, 50.0)], 3, 65.0).is_empty());
    }
}
