//! Opponent-adjusted goals scored per match.

use super::{recent_views, CollectContext, Collector, CollectorOutcome, SCORING_WINDOW};
use crate::cli::types::{Orientation, Parameter};
use crate::engine::normalize::min_max;
use crate::providers::{FixtureView, MatchDataProvider};
use async_trait::async_trait;
use std::sync::Arc;

pub struct AttackCollector {
    provider: Arc<dyn MatchDataProvider>,
}

impl AttackCollector {
    pub fn new(provider: Arc<dyn MatchDataProvider>) -> Self {
        Self { provider }
    }
}

/// Multipliers rewarding output against stronger opposition: 1.5 for the
/// strongest opponent in the window down to 0.5 for the weakest; flat 1.0
/// when ratings are not available for the whole window.
pub(crate) fn opponent_factors(views: &[FixtureView]) -> Vec<f64> {
    if views.iter().all(|v| v.opponent_rating.is_some()) {
        let keyed: Vec<(usize, Option<f64>)> = views
            .iter()
            .enumerate()
            .map(|(i, v)| (i, v.opponent_rating))
            .collect();
        min_max(&keyed, Orientation::HigherIsBetter)
            .into_iter()
            .map(|(_, normalized)| 0.5 + normalized.unwrap_or(0.5))
            .collect()
    } else {
        vec![1.0; views.len()]
    }
}

pub(crate) fn offensive_rating(views: &[FixtureView]) -> f64 {
    let factors = opponent_factors(views);
    let adjusted: f64 = views
        .iter()
        .zip(&factors)
        .map(|(view, factor)| view.goals_for as f64 * factor)
        .sum();
    adjusted / views.len() as f64
}

#[async_trait]
impl Collector for AttackCollector {
    fn parameter(&self) -> Parameter {
        Parameter::OffensiveRating
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        match recent_views(&self.provider, ctx, SCORING_WINDOW).await {
            Ok(views) => CollectorOutcome::validated(offensive_rating(&views)),
            Err(outcome) => outcome,
        }
    }
}
