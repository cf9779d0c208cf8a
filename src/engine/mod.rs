//! The pure compute core: normalization, aggregation and market pricing.
//!
//! Nothing in this module touches the database or the network; everything is
//! a deterministic function of its inputs plus a frozen configuration.

pub mod aggregate;
pub mod normalize;
pub mod odds;

pub use aggregate::{aggregate, Aggregate};
pub use normalize::{min_max, DEGENERATE_NORMALIZED};
pub use odds::{price_markets, MarketPrices, MatchContext, OddsInput, PairwiseRecord, TeamSide};
