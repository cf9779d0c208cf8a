//! Deterministic in-process provider for tests.
//!
//! Serves whatever was loaded into it and can be told to fail specific
//! operations a number of times before succeeding, which is how the retry
//! path is exercised without a network.

use super::{
    MatchDataProvider, ProviderCompetition, ProviderError, ProviderFixture, ProviderResult,
    ProviderTeam, SquadSnapshot, StandingRow, ValuationProvider,
};
use crate::cli::types::Season;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum PlannedFailure {
    Transient { remaining: u32 },
    Permanent,
}

#[derive(Default)]
struct StubState {
    competitions: HashMap<String, ProviderCompetition>,
    teams: HashMap<String, Vec<ProviderTeam>>,
    ratings: HashMap<String, f64>,
    fixtures: HashMap<String, Vec<ProviderFixture>>,
    standings: HashMap<String, Vec<StandingRow>>,
    squads: HashMap<String, SquadSnapshot>,
    failures: HashMap<String, PlannedFailure>,
    calls: HashMap<String, u32>,
}

/// In-memory implementation of both provider traits.
pub struct StaticProvider {
    name: String,
    state: Mutex<StubState>,
}

impl StaticProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(StubState::default()),
        }
    }

    pub fn add_competition(&self, competition: ProviderCompetition) {
        self.state
            .lock()
            .unwrap()
            .competitions
            .insert(competition.name.clone(), competition);
    }

    pub fn add_competition_teams(&self, competition: &str, teams: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.teams.insert(
            competition.to_string(),
            teams
                .iter()
                .map(|name| ProviderTeam {
                    name: name.to_string(),
                    confederation: Some("UEFA".to_string()),
                    external_id: None,
                })
                .collect(),
        );
    }

    pub fn set_rating(&self, team: &str, elo: f64) {
        self.state
            .lock()
            .unwrap()
            .ratings
            .insert(team.to_string(), elo);
    }

    pub fn set_fixtures(&self, team: &str, fixtures: Vec<ProviderFixture>) {
        self.state
            .lock()
            .unwrap()
            .fixtures
            .insert(team.to_string(), fixtures);
    }

    pub fn set_standings(&self, competition: &str, rows: Vec<StandingRow>) {
        self.state
            .lock()
            .unwrap()
            .standings
            .insert(competition.to_string(), rows);
    }

    pub fn set_squad(&self, team: &str, squad: SquadSnapshot) {
        self.state
            .lock()
            .unwrap()
            .squads
            .insert(team.to_string(), squad);
    }

    /// Make the operation keyed `op` fail transiently `times` times, then
    /// succeed. Keys are `rating:<team>`, `fixtures:<team>`,
    /// `standings:<competition>`, `squad:<team>`, `teams:<competition>`.
    pub fn fail_transient(&self, op: &str, times: u32) {
        self.state.lock().unwrap().failures.insert(
            op.to_string(),
            PlannedFailure::Transient { remaining: times },
        );
    }

    /// Make the operation keyed `op` fail permanently on every call.
    pub fn fail_permanent(&self, op: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op.to_string(), PlannedFailure::Permanent);
    }

    /// How many times an operation was attempted.
    pub fn call_count(&self, op: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(op)
            .copied()
            .unwrap_or(0)
    }

    fn gate(&self, op: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op.to_string()).or_insert(0) += 1;
        match state.failures.get_mut(op) {
            Some(PlannedFailure::Transient { remaining }) if *remaining > 0 => {
                *remaining -= 1;
                Err(ProviderError::Transient(format!("planned failure of {op}")))
            }
            Some(PlannedFailure::Permanent) => {
                Err(ProviderError::Permanent(format!("planned failure of {op}")))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MatchDataProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn competition_info(
        &self,
        competition: &str,
        _season: Season,
    ) -> ProviderResult<ProviderCompetition> {
        self.gate(&format!("competition:{competition}"))?;
        self.state
            .lock()
            .unwrap()
            .competitions
            .get(competition)
            .cloned()
            .ok_or_else(|| ProviderError::Permanent(format!("unknown competition {competition}")))
    }

    async fn competition_teams(
        &self,
        competition: &str,
        _season: Season,
    ) -> ProviderResult<Vec<ProviderTeam>> {
        self.gate(&format!("teams:{competition}"))?;
        self.state
            .lock()
            .unwrap()
            .teams
            .get(competition)
            .cloned()
            .ok_or_else(|| ProviderError::Permanent(format!("unknown competition {competition}")))
    }

    async fn team_rating(&self, team: &str) -> ProviderResult<f64> {
        self.gate(&format!("rating:{team}"))?;
        self.state
            .lock()
            .unwrap()
            .ratings
            .get(team)
            .copied()
            .ok_or_else(|| ProviderError::Permanent(format!("unknown team {team}")))
    }

    async fn recent_fixtures(
        &self,
        team: &str,
        _competition: &str,
        _season: Season,
        limit: usize,
    ) -> ProviderResult<Vec<ProviderFixture>> {
        self.gate(&format!("fixtures:{team}"))?;
        let state = self.state.lock().unwrap();
        let fixtures = state
            .fixtures
            .get(team)
            .cloned()
            .unwrap_or_default();
        Ok(fixtures.into_iter().take(limit).collect())
    }

    async fn standings(
        &self,
        competition: &str,
        _season: Season,
    ) -> ProviderResult<Vec<StandingRow>> {
        self.gate(&format!("standings:{competition}"))?;
        self.state
            .lock()
            .unwrap()
            .standings
            .get(competition)
            .cloned()
            .ok_or_else(|| ProviderError::Permanent(format!("no standings for {competition}")))
    }
}

#[async_trait]
impl ValuationProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn squad(&self, team: &str) -> ProviderResult<SquadSnapshot> {
        self.gate(&format!("squad:{team}"))?;
        self.state
            .lock()
            .unwrap()
            .squads
            .get(team)
            .cloned()
            .ok_or_else(|| ProviderError::Permanent(format!("no squad for {team}")))
    }
}
