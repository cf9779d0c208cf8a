//! Data models for the storage layer

use crate::cli::types::{CompetitionId, FixtureId, Parameter, Season, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A club or national side. Teams exist independent of competitions and are
/// never auto-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub name: String,
    pub confederation: Option<String>,
    /// External provider id, when the provider exposes one.
    pub provider_ref: Option<String>,
}

/// Competition type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionKind {
    #[serde(rename = "domestic-league")]
    DomesticLeague,
    #[serde(rename = "international")]
    International,
}

impl CompetitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionKind::DomesticLeague => "domestic-league",
            CompetitionKind::International => "international",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "domestic-league" => Some(CompetitionKind::DomesticLeague),
            "international" => Some(CompetitionKind::International),
            _ => None,
        }
    }
}

/// One (league or tournament, season) scope, the unit of normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    pub competition_id: CompetitionId,
    pub name: String,
    /// Country name, or "international".
    pub country: String,
    pub kind: CompetitionKind,
    pub season: Season,
    pub tier: Option<u8>,
    pub provider_ref: Option<String>,
}

/// The central record: one team within one (competition, season).
///
/// Raw values are what collectors produced, in their natural units; the
/// normalized map and the strength fields are derived and recomputed from raw
/// values plus the weight vector, never written by collectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team: Team,
    pub competition_id: CompetitionId,
    pub competition_name: String,
    pub season: Season,
    pub raw: BTreeMap<Parameter, Option<f64>>,
    pub normalized: BTreeMap<Parameter, Option<f64>>,
    pub overall_strength: Option<f64>,
    pub local_strength: Option<f64>,
    pub european_strength: Option<f64>,
    /// Covered weight / total weight at the last aggregation; 1.0 = full.
    pub confidence: Option<f64>,
    pub last_updated: u64,
}

impl TeamRecord {
    /// Presentation convenience; the 0-1 value is canonical.
    pub fn overall_percent(&self) -> Option<f64> {
        self.overall_strength.map(|s| s * 100.0)
    }
}

/// Match lifecycle, as reported by the fixture provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(MatchStatus::Scheduled),
            "live" => Some(MatchStatus::Live),
            "finished" => Some(MatchStatus::Finished),
            _ => None,
        }
    }
}

/// A persisted fixture, unique by external fixture id. Score is null until
/// the match finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMatch {
    pub fixture_id: FixtureId,
    pub competition_id: CompetitionId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    /// ISO-8601 kickoff date.
    pub kickoff: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub status: MatchStatus,
}

/// Coverage and freshness for one competition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionCoverage {
    pub competition: String,
    pub season: Season,
    pub team_count: u32,
    /// Non-null raw values per parameter.
    pub filled: BTreeMap<Parameter, u32>,
    /// Fraction of (team, parameter) cells with a non-null raw value.
    pub coverage: f64,
    pub oldest_update: Option<u64>,
    pub newest_update: Option<u64>,
}

/// Directory entry for the team listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDirectoryEntry {
    pub team_id: TeamId,
    pub name: String,
    pub confederation: Option<String>,
    pub competitions: Vec<String>,
}
