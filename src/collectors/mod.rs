//! Parameter collectors.
//!
//! One collector per strength parameter. A collector fetches from its
//! provider and returns either a raw value in the parameter's natural units
//! or a typed unavailable result; it never writes normalized or aggregate
//! values, and never errors across the component boundary.

pub mod attack;
pub mod availability;
pub mod defense;
pub mod depth;
pub mod elo;
pub mod form;
pub mod h2h;
pub mod motivation;
pub mod squad_value;
pub mod tactics;

use crate::cli::types::Parameter;
use crate::providers::{MatchDataProvider, ProviderError, ValuationProvider};
use crate::storage::models::{Competition, Team};
use async_trait::async_trait;
use std::sync::Arc;

/// Matches considered by the form collector.
pub(crate) const FORM_WINDOW: usize = 5;
/// Recency decay applied per match of age in the form signal.
pub(crate) const FORM_DECAY: f64 = 0.9;
/// Matches considered by the offensive/defensive/tactical collectors.
pub(crate) const SCORING_WINDOW: usize = 10;
/// Rolling window of the per-team head-to-head signal.
pub(crate) const H2H_WINDOW: usize = 10;

/// The (team, competition, season) a collector is asked about.
#[derive(Debug, Clone)]
pub struct CollectContext {
    pub team: Team,
    pub competition: Competition,
}

/// What one collector call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorOutcome {
    /// A raw value in the parameter's natural units.
    Value(f64),
    /// No value; permanent failures are surfaced and never overwrite the
    /// last good raw value, transient ones are retried by the orchestrator.
    Unavailable { permanent: bool, reason: String },
}

impl CollectorOutcome {
    /// Accept a candidate value, rejecting non-finite or negative results as
    /// permanently invalid.
    pub fn validated(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            CollectorOutcome::Value(value)
        } else {
            CollectorOutcome::Unavailable {
                permanent: true,
                reason: format!("value {value} outside admissible range"),
            }
        }
    }

    pub fn missing(reason: impl Into<String>) -> Self {
        CollectorOutcome::Unavailable {
            permanent: true,
            reason: reason.into(),
        }
    }

    pub fn is_transient_failure(&self) -> bool {
        matches!(
            self,
            CollectorOutcome::Unavailable {
                permanent: false,
                ..
            }
        )
    }
}

impl From<ProviderError> for CollectorOutcome {
    fn from(err: ProviderError) -> Self {
        CollectorOutcome::Unavailable {
            permanent: !err.is_transient(),
            reason: err.to_string(),
        }
    }
}

/// A single-parameter collector bound to its provider.
#[async_trait]
pub trait Collector: Send + Sync {
    fn parameter(&self) -> Parameter;

    /// Name of the provider pool whose concurrency bound applies.
    fn provider_name(&self) -> &str;

    /// Produce the raw value for one (team, competition, season). Idempotent
    /// up to the provider's own refresh cadence.
    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome;
}

/// Fetch a team's completed-match views over a window, mapping provider
/// failures onto a ready-made outcome.
pub(crate) async fn recent_views(
    provider: &Arc<dyn MatchDataProvider>,
    ctx: &CollectContext,
    window: usize,
) -> Result<Vec<crate::providers::FixtureView>, CollectorOutcome> {
    let fixtures = provider
        .recent_fixtures(
            &ctx.team.name,
            &ctx.competition.name,
            ctx.competition.season,
            window * 2,
        )
        .await
        .map_err(CollectorOutcome::from)?;

    let views: Vec<crate::providers::FixtureView> = fixtures
        .iter()
        .filter_map(|f| f.view_for(&ctx.team.name))
        .take(window)
        .collect();

    if views.is_empty() {
        return Err(CollectorOutcome::missing("no completed matches"));
    }
    Ok(views)
}

/// The full collector set wired to the two external providers.
pub fn default_collectors(
    matches: Arc<dyn MatchDataProvider>,
    valuation: Arc<dyn ValuationProvider>,
) -> Vec<Arc<dyn Collector>> {
    vec![
        Arc::new(elo::EloCollector::new(matches.clone())),
        Arc::new(squad_value::SquadValueCollector::new(valuation.clone())),
        Arc::new(form::FormCollector::new(matches.clone())),
        Arc::new(depth::SquadDepthCollector::new(valuation.clone())),
        Arc::new(availability::AvailabilityCollector::new(valuation)),
        Arc::new(motivation::MotivationCollector::new(matches.clone())),
        Arc::new(tactics::TacticsCollector::new(matches.clone())),
        Arc::new(attack::AttackCollector::new(matches.clone())),
        Arc::new(defense::DefenseCollector::new(matches.clone())),
        Arc::new(h2h::HeadToHeadCollector::new(matches)),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::CollectContext;
    use crate::cli::types::{CompetitionId, Season, TeamId};
    use crate::storage::models::{Competition, CompetitionKind, Team};

    pub fn context(team: &str, competition: &str) -> CollectContext {
        CollectContext {
            team: Team {
                team_id: TeamId::new(1),
                name: team.to_string(),
                confederation: None,
                provider_ref: None,
            },
            competition: Competition {
                competition_id: CompetitionId::new(1),
                name: competition.to_string(),
                country: "Italy".to_string(),
                kind: CompetitionKind::DomesticLeague,
                season: Season::new(2025),
                tier: Some(1),
                provider_ref: None,
            },
        }
    }
}
