//! Pluggable external data providers.
//!
//! Each collector is constructed against these traits, never against a
//! concrete API; base URLs and credentials are injected through
//! [`ProviderConfig`]. Failures are typed transient/permanent at this
//! boundary so the orchestrator can decide retry vs escalate.

pub mod football_api;
pub mod http;
pub mod types;
pub mod valuation;

#[cfg(any(test, feature = "test-utils"))]
pub mod stub;

use crate::cli::types::Season;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use types::{
    FixtureView, ProviderCompetition, ProviderFixture, ProviderTeam, SquadPlayer, SquadSnapshot,
    StandingRow,
};

/// How a provider call failed. Transient failures are retried with backoff;
/// permanent ones are surfaced and never clobber the last good value.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("transient provider failure: {0}")]
    Transient(String),
    #[error("permanent provider failure: {0}")]
    Permanent(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Injected provider identity and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Stable name; also the key of the orchestrator's concurrency pool.
    pub name: String,
    pub base_url: String,
    /// Sent as an auth header when present.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Overrides `collector.concurrency_per_provider` when set.
    #[serde(default)]
    pub rate_limit: Option<usize>,
}

/// Match, rating and standings source.
#[async_trait]
pub trait MatchDataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Describe a competition the caller only knows by name.
    async fn competition_info(
        &self,
        competition: &str,
        season: Season,
    ) -> ProviderResult<ProviderCompetition>;

    /// Teams taking part in a competition season.
    async fn competition_teams(
        &self,
        competition: &str,
        season: Season,
    ) -> ProviderResult<Vec<ProviderTeam>>;

    /// Match-based rating (elo) for one team.
    async fn team_rating(&self, team: &str) -> ProviderResult<f64>;

    /// A team's most recent fixtures in a competition, newest first.
    async fn recent_fixtures(
        &self,
        team: &str,
        competition: &str,
        season: Season,
        limit: usize,
    ) -> ProviderResult<Vec<ProviderFixture>>;

    /// Standings snapshot for a competition.
    async fn standings(
        &self,
        competition: &str,
        season: Season,
    ) -> ProviderResult<Vec<StandingRow>>;
}

/// Squad-valuation source.
#[async_trait]
pub trait ValuationProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Current squad with market values for one team.
    async fn squad(&self, team: &str) -> ProviderResult<SquadSnapshot>;
}
