//! Dry-run execution of a signal's DeFi actions
//!
//! Nothing here touches live liquidity. Immediate actions are "executed" in
//! priority order and given a random transaction hash so the log reads like
//! a real run; deferred actions are recorded as queued with their trigger.

use edge_core::{ActionKind, DefiAction, Timing};
use tracing::{info, warn};

/// Actions split by when they would run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionPlan {
    /// Sorted by priority, lowest first
    pub immediate: Vec<DefiAction>,
    pub deferred: Vec<DefiAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTx {
    pub protocol: String,
    pub action: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub executed: Vec<SimulatedTx>,
    pub prepared: usize,
    pub queued: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefiSimulator;

impl DefiSimulator {
    pub fn plan(&self, actions: &[DefiAction]) -> ExecutionPlan {
        let mut sorted = actions.to_vec();
        sorted.sort_by_key(|a| a.priority);

        let (immediate, deferred): (Vec<_>, Vec<_>) = sorted
            .into_iter()
            .partition(|a| a.timing == Timing::Immediate);

        ExecutionPlan {
            immediate,
            deferred,
        }
    }

    /// Log the plan, then simulate the immediate actions
    pub fn run(&self, actions: &[DefiAction]) -> SimulationReport {
        let plan = self.plan(actions);
        log_plan(&plan);

        let mut report = SimulationReport {
            queued: plan.deferred.len(),
            ..Default::default()
        };

        for action in &plan.immediate {
            match &action.action_type {
                ActionKind::Prepare => {
                    info!(
                        "Prepared {} -> {} on {}",
                        action.from_asset.as_deref().unwrap_or("?"),
                        action.to_asset.as_deref().unwrap_or("?"),
                        action.protocol
                    );
                    report.prepared += 1;
                }
                ActionKind::Other(kind) => {
                    warn!("Skipping unknown action type {:?} on {}", kind, action.protocol);
                    report.skipped += 1;
                }
                kind => {
                    let tx_hash = simulated_tx_hash();
                    info!(
                        "Simulated {} {} of {} on {}: {}",
                        kind,
                        action.allocation,
                        asset_label(action),
                        action.protocol,
                        tx_hash
                    );
                    report.executed.push(SimulatedTx {
                        protocol: action.protocol.clone(),
                        action: kind.to_string(),
                        tx_hash,
                    });
                }
            }
        }

        info!(
            "Simulated {}/{} actions ({} queued, {} skipped)",
            report.executed.len(),
            actions.len(),
            report.queued,
            report.skipped
        );
        report
    }
}

fn asset_label(action: &DefiAction) -> String {
    match (&action.from_asset, &action.to_asset) {
        (Some(from), Some(to)) => format!("{} -> {}", from, to),
        (Some(asset), None) | (None, Some(asset)) => asset.clone(),
        (None, None) => "unspecified asset".to_string(),
    }
}

fn log_plan(plan: &ExecutionPlan) {
    info!("Dry run: {} immediate, {} deferred", plan.immediate.len(), plan.deferred.len());
    for (i, a) in plan.immediate.iter().enumerate() {
        info!("  {}. {} on {} ({})", i + 1, a.action_type, a.protocol, a.allocation);
    }
    for (i, a) in plan.deferred.iter().enumerate() {
        info!(
            "  queued {}. {} on {} ({}), trigger: {}",
            i + 1,
            a.action_type,
            a.protocol,
            a.timing,
            a.trigger_condition.as_deref().unwrap_or("none")
        );
    }
}

/// Random 32-byte hex hash
fn simulated_tx_hash() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(kind: ActionKind, timing: Timing, priority: u32) -> DefiAction {
        DefiAction {
            protocol: "aave".to_string(),
            action_type: kind,
            from_asset: Some("USDC".to_string()),
            to_asset: None,
            allocation: "50%".to_string(),
            timing,
            trigger_condition: None,
            priority,
        }
    }

    #[test]
    fn test_plan_sorts_and_splits() {
        let actions = vec![
            action(ActionKind::Swap, Timing::Immediate, 3),
            action(ActionKind::Prepare, Timing::OnEvent, 2),
            action(ActionKind::Lend, Timing::Immediate, 1),
        ];

        let plan = DefiSimulator.plan(&actions);
        let priorities: Vec<_> = plan.immediate.iter().map(|a| a.priority).collect();
        assert_eq!(priorities, vec![1, 3]);
        assert_eq!(plan.deferred.len(), 1);
    }

    #[test]
    fn test_run_executes_only_known_immediate_actions() {
        let actions = vec![
            action(ActionKind::Lend, Timing::Immediate, 1),
            action(ActionKind::Other("bridge".to_string()), Timing::Immediate, 2),
            action(ActionKind::Prepare, Timing::Immediate, 3),
            action(ActionKind::Stake, Timing::Gradual, 4),
        ];

        let report = DefiSimulator.run(&actions);
        assert_eq!(report.executed.len(), 1);
        assert_eq!(report.executed[0].action, "lend");
        assert_eq!(report.skipped, 1);
        assert_eq!(report.prepared, 1);
        assert_eq!(report.queued, 1);
    }

    #[test]
    fn test_simulated_hash_shape() {
        let hash = simulated_tx_hash();
        assert_eq!(hash.len(), 66);
        assert!(hash.starts_with("0x"));
        assert_ne!(hash, simulated_tx_hash());
    }
}
