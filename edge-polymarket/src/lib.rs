//! Polymarket market source for the CrowdEdge agent
//!
//! Reads open markets from the public Gamma API (no authentication) and
//! reduces them to the subset worth classifying.

pub mod client;
pub mod filter;
pub mod source;
pub mod types;

pub use client::GammaClient;
pub use filter::MarketFilter;
pub use source::MarketSource;
pub use types::GammaMarket;
