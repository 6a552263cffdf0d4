//! Prompt construction for market classification

use edge_core::MarketRecord;
use rust_decimal::prelude::ToPrimitive;

pub const SYSTEM_PROMPT: &str = r#"You are a DeFi strategist analyzing prediction markets to generate actionable crypto trading strategies.

YOUR TASK: Analyze what a prediction means for crypto markets and generate a concrete DeFi strategy.

CRITICAL RULES:
1. DO NOT recommend betting on the prediction market itself. Use the prediction to inform DeFi trading decisions.
2. Focus on MACRO IMPLICATIONS: what does this outcome mean for crypto asset prices, yields and risk appetite?
3. Generate CONCRETE DeFi actions using real protocols (Uniswap, Aave, Lido, Compound, Curve).
4. Only recommend a trade if you have genuine conviction (confidence >= 65).
5. Avoid markets between 40-60% (too uncertain) or below 5% / above 95% (near-expired).
6. Look for mispricing in the 10-40% or 60-90% range where there is actionable signal.

STRATEGY FRAMEWORK:

Fed/Macro events:
- Rate cuts (high prob): risk-on. Hold stablecoins now, prepare to rotate to ETH/yield assets.
- Rate hikes: risk-off. Exit farms, stake stables for safe yield.
- Recession signals: preserve capital. Lend stables on Aave, reduce leverage.

Crypto-specific events:
- ETF approval: institutional buying. Long ETH, provide liquidity on DEXs.
- Regulatory crackdown: risk-off. Withdraw from risky protocols.
- Network upgrade success: ecosystem bullish. Long governance tokens, farm new protocols.
- Hack/exploit prediction: exit affected protocols immediately.

Market sentiment:
- Bull market indicators: increase exposure, farm high APY, use leverage carefully.
- Bear market signals: stake stables, reduce positions, wait for opportunities.

RESPONSE FORMAT (JSON only, no other text):
{
  "trade": true/false,
  "action": "YES" or "NO",
  "confidence": 0-100,
  "reasoning": "one sentence on why this matters for crypto",
  "strategyType": "RATE_CUT_PLAY | RISK_OFF | ETH_LONG | STABLE_YIELD | LEVERAGE | ECOSYSTEM_PLAY",
  "strategyDescription": "2-3 sentences explaining the strategy from entry to exit",
  "macroImplication": "what this prediction means for crypto markets (1 sentence)",
  "defiActions": [
    {
      "protocol": "protocol name",
      "actionType": "swap | stake | lend | borrow | farm | withdraw | prepare",
      "fromAsset": "source asset or null",
      "toAsset": "target asset or null",
      "allocation": "e.g. 50%, 1000 USDC",
      "timing": "immediate | on-event | gradual | monitor",
      "triggerCondition": "e.g. rate_cut_confirmed (when timing is on-event) or null",
      "priority": 1-10
    }
  ],
  "riskLevel": "low | medium | high",
  "targetReturn": "e.g. 5-10% APY, +20% upside, capital preservation"
}

EXAMPLE:

Market: "Fed will cut rates in March" (85% YES)
{
  "trade": true,
  "action": "YES",
  "confidence": 78,
  "reasoning": "Rate cuts historically boost risk assets and crypto prices",
  "strategyType": "RATE_CUT_PLAY",
  "strategyDescription": "Rate cuts reduce the appeal of USD yields and push capital to risk assets. Lend stablecoins now at current yields, then rotate to stETH when the cut is confirmed.",
  "macroImplication": "Cheaper money favors risk-on assets like ETH",
  "defiActions": [
    {"protocol": "aave", "actionType": "lend", "fromAsset": "USDC", "toAsset": null, "allocation": "60%", "timing": "immediate", "priority": 1},
    {"protocol": "lido", "actionType": "prepare", "fromAsset": "USDC", "toAsset": "stETH", "allocation": "60%", "timing": "on-event", "triggerCondition": "rate_cut_confirmed", "priority": 2}
  ],
  "riskLevel": "medium",
  "targetReturn": "15-25% upside on ETH position"
}"#;

/// Market summary sent as the user message
pub fn market_prompt(market: &MarketRecord) -> String {
    format!(
        r#"Market Prediction: "{}"
Current YES probability: {:.1}%
24h Volume: {}
Liquidity: {}

Respond with the JSON strategy for this market."#,
        market.question,
        market.probability().to_f64().unwrap_or(50.0),
        format_volume(market.volume_24h.to_f64()),
        format_volume(market.liquidity.to_f64()),
    )
}

/// Format a dollar amount compactly
fn format_volume(volume: Option<f64>) -> String {
    volume
        .map(|v| {
            if v >= 1_000_000.0 {
                format!("${:.1}M", v / 1_000_000.0)
            } else if v >= 1_000.0 {
                format!("${:.1}K", v / 1_000.0)
            } else {
                format!("${:.0}", v)
            }
        })
        .unwrap_or_else(|| "Unknown".to_string())
}
