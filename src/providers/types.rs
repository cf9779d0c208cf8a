//! Wire types shared by every provider adapter.
//!
//! These are the minimum records the core needs back from external data
//! sources; concrete adapters map whatever their API returns onto them.

use crate::storage::models::MatchStatus;
use serde::{Deserialize, Serialize};

/// Competition metadata as described by the fixture provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderCompetition {
    pub name: String,
    /// Country name, or "international".
    pub country: String,
    pub kind: crate::storage::models::CompetitionKind,
    #[serde(default)]
    pub tier: Option<u8>,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// A team as listed by the fixture provider for one competition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderTeam {
    pub name: String,
    #[serde(default)]
    pub confederation: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
}

/// One fixture as reported by the provider. Goals are null until finished.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderFixture {
    pub fixture_id: i64,
    pub competition: String,
    /// ISO-8601 kickoff date.
    pub kickoff: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_goals: Option<u32>,
    #[serde(default)]
    pub away_goals: Option<u32>,
    pub status: MatchStatus,
    /// Opponent-side elo at kickoff, when the provider carries ratings.
    #[serde(default)]
    pub home_rating: Option<f64>,
    #[serde(default)]
    pub away_rating: Option<f64>,
}

/// One fixture seen from one team's perspective.
#[derive(Debug, Clone, Copy)]
pub struct FixtureView {
    pub goals_for: u32,
    pub goals_against: u32,
    pub opponent_rating: Option<f64>,
}

impl ProviderFixture {
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
            && self.home_goals.is_some()
            && self.away_goals.is_some()
    }

    /// Project the fixture onto `team`'s side; None when the team did not
    /// play in it or the score is not final.
    pub fn view_for(&self, team: &str) -> Option<FixtureView> {
        if !self.is_finished() {
            return None;
        }
        let (home_goals, away_goals) = (self.home_goals?, self.away_goals?);
        if self.home_team.eq_ignore_ascii_case(team) {
            Some(FixtureView {
                goals_for: home_goals,
                goals_against: away_goals,
                opponent_rating: self.away_rating,
            })
        } else if self.away_team.eq_ignore_ascii_case(team) {
            Some(FixtureView {
                goals_for: away_goals,
                goals_against: home_goals,
                opponent_rating: self.home_rating,
            })
        } else {
            None
        }
    }
}

/// A standings row at the time of collection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StandingRow {
    pub team: String,
    /// 1-based league position.
    pub position: u32,
    pub played: u32,
    pub points: u32,
}

/// One player in a squad valuation snapshot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquadPlayer {
    pub name: String,
    /// Market value in the provider's monetary unit.
    pub market_value: f64,
    #[serde(default)]
    pub key_player: bool,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// A team's squad with market values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquadSnapshot {
    pub team: String,
    pub players: Vec<SquadPlayer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(home: &str, away: &str, hg: u32, ag: u32) -> ProviderFixture {
        ProviderFixture {
            fixture_id: 1,
            competition: "League".to_string(),
            kickoff: "2025-08-10".to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_goals: Some(hg),
            away_goals: Some(ag),
            status: MatchStatus::Finished,
            home_rating: Some(1500.0),
            away_rating: Some(1450.0),
        }
    }

    #[test]
    fn view_for_projects_both_sides() {
        let f = fixture("Inter", "Milan", 2, 1);
        let home = f.view_for("Inter").unwrap();
        assert_eq!((home.goals_for, home.goals_against), (2, 1));
        assert_eq!(home.opponent_rating, Some(1450.0));

        let away = f.view_for("milan").unwrap();
        assert_eq!((away.goals_for, away.goals_against), (1, 2));
        assert_eq!(away.opponent_rating, Some(1500.0));

        assert!(f.view_for("Roma").is_none());
    }

    #[test]
    fn unfinished_fixture_has_no_view() {
        let mut f = fixture("Inter", "Milan", 0, 0);
        f.status = MatchStatus::Scheduled;
        f.home_goals = None;
        f.away_goals = None;
        assert!(f.view_for("Inter").is_none());
    }
}
