//! Quality-weighted squad size.

use super::{CollectContext, Collector, CollectorOutcome};
use crate::cli::types::Parameter;
use crate::providers::ValuationProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// Reference per-player market value anchoring the quality factor.
const REFERENCE_PLAYER_VALUE: f64 = 1_000_000.0;
/// Floor so cheap large squads still register some depth.
const MIN_QUALITY_FACTOR: f64 = 0.1;

pub struct SquadDepthCollector {
    provider: Arc<dyn ValuationProvider>,
}

impl SquadDepthCollector {
    pub fn new(provider: Arc<dyn ValuationProvider>) -> Self {
        Self { provider }
    }
}

/// Squad size scaled by a logarithmic quality factor: an order of magnitude
/// in average player value moves the factor by one, so two squads of equal
/// size but 10x value differ materially.
pub(crate) fn depth_indicator(size: usize, total_value: f64) -> f64 {
    let average = total_value / size as f64;
    let quality = 1.0 + (average / REFERENCE_PLAYER_VALUE).log10();
    size as f64 * quality.max(MIN_QUALITY_FACTOR)
}

#[async_trait]
impl Collector for SquadDepthCollector {
    fn parameter(&self) -> Parameter {
        Parameter::SquadDepth
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        let squad = match self.provider.squad(&ctx.team.name).await {
            Ok(squad) => squad,
            Err(err) => return err.into(),
        };
        if squad.players.is_empty() {
            return CollectorOutcome::missing("empty squad");
        }
        let total: f64 = squad.players.iter().map(|p| p.market_value).sum();
        if total <= 0.0 {
            return CollectorOutcome::missing("squad has no market value");
        }
        CollectorOutcome::validated(depth_indicator(squad.players.len(), total))
    }
}
