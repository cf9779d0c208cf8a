//! Per-team tactical style profile.
//!
//! Tactical matchup is inherently pairwise; what is stored is each team's
//! style-intensity scalar, and the odds engine combines the two sides'
//! profiles at query time.

use super::{recent_views, CollectContext, Collector, CollectorOutcome, SCORING_WINDOW};
use crate::cli::types::Parameter;
use crate::providers::{FixtureView, MatchDataProvider};
use async_trait::async_trait;
use std::sync::Arc;

/// League-average total goals per match.
const GOAL_INVOLVEMENT_BASE: f64 = 2.6;

const STYLE_MIN: f64 = 0.2;
const STYLE_MAX: f64 = 2.0;

pub struct TacticsCollector {
    provider: Arc<dyn MatchDataProvider>,
}

impl TacticsCollector {
    pub fn new(provider: Arc<dyn MatchDataProvider>) -> Self {
        Self { provider }
    }
}

/// Style intensity: total goal involvement per match against the league
/// average. Open, front-foot sides land above 1.0; low-block sides below.
pub(crate) fn style_profile(views: &[FixtureView]) -> f64 {
    let involvement: u32 = views
        .iter()
        .map(|view| view.goals_for + view.goals_against)
        .sum();
    let per_match = involvement as f64 / views.len() as f64;
    (per_match / GOAL_INVOLVEMENT_BASE).clamp(STYLE_MIN, STYLE_MAX)
}

#[async_trait]
impl Collector for TacticsCollector {
    fn parameter(&self) -> Parameter {
        Parameter::TacticalMatchup
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        match recent_views(&self.provider, ctx, SCORING_WINDOW).await {
            Ok(views) => CollectorOutcome::validated(style_profile(&views)),
            Err(outcome) => outcome,
        }
    }
}
