//! Recency-weighted points over the last five completed matches.

use super::{CollectContext, Collector, CollectorOutcome, FORM_DECAY, FORM_WINDOW};
use crate::cli::types::{Orientation, Parameter};
use crate::engine::normalize::min_max;
use crate::providers::{FixtureView, MatchDataProvider};
use async_trait::async_trait;
use std::sync::Arc;

pub struct FormCollector {
    provider: Arc<dyn MatchDataProvider>,
}

impl FormCollector {
    pub fn new(provider: Arc<dyn MatchDataProvider>) -> Self {
        Self { provider }
    }
}

fn match_points(view: &FixtureView) -> f64 {
    if view.goals_for > view.goals_against {
        3.0
    } else if view.goals_for == view.goals_against {
        1.0
    } else {
        0.0
    }
}

/// Weighted sum of 3/1/0 points, newest match first with weight 1.0 and each
/// older match decayed by 0.9. When the provider carries opponent ratings for
/// the whole window, each match is additionally scaled by the opponent's
/// rating normalized within the window (0.5 for the weakest opponent faced,
/// 1.5 for the strongest).
pub(crate) fn weighted_form(views: &[FixtureView]) -> f64 {
    let opponent_factor: Vec<f64> = if views.iter().all(|v| v.opponent_rating.is_some()) {
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
    };

    views
        .iter()
        .zip(opponent_factor)
        .enumerate()
        .map(|(age, (view, factor))| FORM_DECAY.powi(age as i32) * match_points(view) * factor)
        .sum()
}

#[async_trait]
impl Collector for FormCollector {
    fn parameter(&self) -> Parameter {
        Parameter::Form
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        let fixtures = match self
            .provider
            .recent_fixtures(
                &ctx.team.name,
                &ctx.competition.name,
                ctx.competition.season,
                FORM_WINDOW * 2,
            )
            .await
        {
            Ok(fixtures) => fixtures,
            Err(err) => return err.into(),
        };

        let views: Vec<FixtureView> = fixtures
            .iter()
            .filter_map(|f| f.view_for(&ctx.team.name))
            .take(FORM_WINDOW)
            .collect();

        if views.is_empty() {
            return CollectorOutcome::missing("no completed matches");
        }
        CollectorOutcome::validated(weighted_form(&views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::test_support::context;
    use crate::providers::stub::StaticProvider;
    use crate::providers::ProviderFixture;
    use crate::storage::models::MatchStatus;

    fn view(goals_for: u32, goals_against: u32, opponent_rating: Option<f64>) -> FixtureView {
        FixtureView {
            goals_for,
            goals_against,
            opponent_rating,
        }
    }

    #[test]
    fn decay_weights_points() {
        // W, D, L newest first: 3*1.0 + 1*0.9 + 0*0.81
        let views = [view(2, 0, None), view(1, 1, None), view(0, 1, None)];
        let form = weighted_form(&views);
        assert!((form - 3.9).abs() < 1e-12);
    }

    #[test]
    fn five_wins_without_ratings() {
        let views = [view(1, 0, None); 5];
        let expected: f64 = (0..5).map(|i| 3.0 * 0.9_f64.powi(i)).sum();
        assert!((weighted_form(&views) - expected).abs() < 1e-12);
    }

    #[test]
    fn opponent_scaling_rewards_beating_strong_sides() {
        // Same results, but one window beat the stronger opponents.
        let strong_first = [view(2, 0, Some(1700.0)), view(2, 0, Some(1400.0))];
        let weak_first = [view(2, 0, Some(1400.0)), view(2, 0, Some(1700.0))];
        assert!(weighted_form(&strong_first) > weighted_form(&weak_first));
    }

    #[test]
    fn equal_ratings_degenerate_to_unit_factor() {
        let flat = [view(2, 0, Some(1500.0)), view(1, 1, Some(1500.0))];
        let bare = [view(2, 0, None), view(1, 1, None)];
        assert!((weighted_form(&flat) - weighted_form(&bare)).abs() < 1e-12);
    }

    #[tokio::test]
    async fn collects_from_provider_window() {
        let provider = Arc::new(StaticProvider::new("matches"));
        provider.set_fixtures(
            "Inter",
            vec![
                ProviderFixture {
                    fixture_id: 1,
                    competition: "Serie A".to_string(),
                    kickoff: "2025-09-20".to_string(),
                    home_team: "Inter".to_string(),
                    away_team: "Milan".to_string(),
                    home_goals: Some(2),
                    away_goals: Some(0),
                    status: MatchStatus::Finished,
                    home_rating: None,
                    away_rating: None,
                },
                ProviderFixture {
                    fixture_id: 2,
                    competition: "Serie A".to_string(),
                    kickoff: "2025-09-27".to_string(),
                    home_team: "Inter".to_string(),
                    away_team: "Roma".to_string(),
                    home_goals: None,
                    away_goals: None,
                    status: MatchStatus::Scheduled,
                    home_rating: None,
                    away_rating: None,
                },
            ],
        );
        let collector = FormCollector::new(provider);

        // Only the finished match counts: a single win at weight 1.0.
        let outcome = collector.collect(&context("Inter", "Serie A")).await;
        assert_eq!(outcome, CollectorOutcome::Value(3.0));
    }

    #[tokio::test]
    async fn empty_history_is_permanent_unavailable() {
        let provider = Arc::new(StaticProvider::new("matches"));
        provider.set_fixtures("Inter", Vec::new());
        let collector = FormCollector::new(provider);

        let outcome = collector.collect(&context("Inter", "Serie A")).await;
        assert_eq!(
            outcome,
            CollectorOutcome::missing("no completed matches")
        );
    }
}
