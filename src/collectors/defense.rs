//! Inverse of opponent-adjusted goals conceded per match.

use super::attack::opponent_factors;
use super::{recent_views, CollectContext, Collector, CollectorOutcome, SCORING_WINDOW};
use crate::cli::types::Parameter;
use crate::providers::{FixtureView, MatchDataProvider};
use async_trait::async_trait;
use std::sync::Arc;

pub struct DefenseCollector {
    provider: Arc<dyn MatchDataProvider>,
}

impl DefenseCollector {
    pub fn new(provider: Arc<dyn MatchDataProvider>) -> Self {
        Self { provider }
    }
}

/// Goals conceded weighted by opponent weakness (shipping goals to weak
/// sides is penalized hardest), inverted so higher is better and a clean
/// defensive record maps to 1.0.
pub(crate) fn defensive_rating(views: &[FixtureView]) -> f64 {
    let factors = opponent_factors(views);
    let adjusted: f64 = views
        .iter()
        .zip(&factors)
        .map(|(view, factor)| view.goals_against as f64 * (2.0 - factor))
        .sum();
    let conceded_rate = adjusted / views.len() as f64;
    1.0 / (1.0 + conceded_rate)
}

#[async_trait]
impl Collector for DefenseCollector {
    fn parameter(&self) -> Parameter {
        Parameter::DefensiveRating
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        match recent_views(&self.provider, ctx, SCORING_WINDOW).await {
            Ok(views) => CollectorOutcome::validated(defensive_rating(&views)),
            Err(outcome) => outcome,
        }
    }
}
