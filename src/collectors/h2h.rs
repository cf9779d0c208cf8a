//! Historical head-to-head record signal.
//!
//! Head-to-head is pairwise by nature; the stored per-team scalar is the
//! team's average outcome over a rolling window against all competition
//! peers. The pairwise refinement against a specific opponent happens in the
//! odds engine from stored match history.

use super::{recent_views, CollectContext, Collector, CollectorOutcome, H2H_WINDOW};
use crate::cli::types::Parameter;
use crate::providers::{FixtureView, MatchDataProvider};
use async_trait::async_trait;
use std::sync::Arc;

pub struct HeadToHeadCollector {
    provider: Arc<dyn MatchDataProvider>,
}

impl HeadToHeadCollector {
    pub fn new(provider: Arc<dyn MatchDataProvider>) -> Self {
        Self { provider }
    }
}

/// Average points per meeting over the window, in [0, 3].
pub(crate) fn average_outcome(views: &[FixtureView]) -> f64 {
    let points: f64 = views
        .iter()
        .map(|view| {
            if view.goals_for > view.goals_against {
                3.0
            } else if view.goals_for == view.goals_against {
                1.0
            } else {
                0.0
            }
        })
        .sum();
    points / views.len() as f64
}

#[async_trait]
impl Collector for HeadToHeadCollector {
    fn parameter(&self) -> Parameter {
        Parameter::H2hPerformance
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        match recent_views(&self.provider, ctx, H2H_WINDOW).await {
            Ok(views) => CollectorOutcome::validated(average_outcome(&views)),
            Err(outcome) => outcome,
        }
    }
}
