//! Refresh-cycle orchestration.
//!
//! A cycle runs: provider sync (teams, fixtures) -> parameter collection
//! (bounded per-provider pools, retry with exponential backoff, per-call
//! deadline) -> raw writes -> normalization per (competition, parameter)
//! over the post-collection snapshot -> aggregation per team -> derived
//! strength variants. Late raw writes never leak into a running cycle's
//! normalization: collection completes before the snapshot is read.

use crate::cli::types::{CompetitionId, Orientation, Parameter, Season, TeamId};
use crate::collectors::{CollectContext, Collector, CollectorOutcome, SCORING_WINDOW};
use crate::config::{EngineConfig, RetryConfig};
use crate::engine::normalize::min_max;
use crate::engine::aggregate::aggregate;
use crate::error::{EngineError, Result};
use crate::providers::{MatchDataProvider, ProviderResult};
use crate::storage::models::{Competition, CompetitionCoverage, StoredMatch, Team};
use crate::storage::StrengthDatabase;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Semaphore;

/// What a refresh run targets. Empty lists mean "all".
#[derive(Debug, Clone, Default)]
pub struct RefreshScope {
    pub competitions: Vec<String>,
    pub parameters: Vec<Parameter>,
}

/// Collection counters for one parameter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParameterStats {
    pub attempted: u32,
    pub succeeded: u32,
    pub transient_failures: u32,
    pub permanent_failures: u32,
}

/// Structured summary of one refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshReport {
    pub season: Season,
    pub parameters: BTreeMap<Parameter, ParameterStats>,
    pub competitions: Vec<CompetitionCoverage>,
    /// Competitions whose provider sync failed; their derived values were
    /// not recomputed this cycle.
    pub failed_competitions: Vec<String>,
    /// Collector tasks abandoned at the cycle deadline, deferred to the
    /// next cycle.
    pub deferred: u32,
    pub wall_secs: f64,
    /// Consumers needing a consistent snapshot should read at or after this
    /// timestamp.
    pub cycle_end: u64,
}

struct TaskResult {
    team_id: TeamId,
    competition_id: CompetitionId,
    parameter: Parameter,
    outcome: CollectorOutcome,
}

/// Sequences collectors, normalization and aggregation over a scope.
pub struct Orchestrator {
    config: EngineConfig,
    matches: Arc<dyn MatchDataProvider>,
    collectors: Vec<Arc<dyn Collector>>,
}

/// Delay before retry number `attempt` (1-based): initial * factor^(n-1),
/// capped.
fn backoff_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    let exp = retry.factor.powi(attempt.saturating_sub(1) as i32);
    let secs = (retry.initial_delay_secs as f64 * exp).min(retry.cap_secs as f64);
    Duration::from_secs_f64(secs)
}

async fn provider_with_retry<T, F, Fut>(retry: &RetryConfig, op: F) -> ProviderResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                tokio::time::sleep(backoff_delay(retry, attempt)).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Run one collector call to a final outcome: per-call deadline, transient
/// retries with backoff, permanent failures returned as-is.
async fn collect_with_retry(
    collector: &dyn Collector,
    ctx: &CollectContext,
    retry: &RetryConfig,
    call_timeout: Duration,
) -> CollectorOutcome {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let outcome = match tokio::time::timeout(call_timeout, collector.collect(ctx)).await {
            Ok(outcome) => outcome,
            Err(_) => CollectorOutcome::Unavailable {
                permanent: false,
                reason: format!("call deadline of {call_timeout:?} exceeded"),
            },
        };
        if outcome.is_transient_failure() && attempt < retry.max_attempts {
            tokio::time::sleep(backoff_delay(retry, attempt)).await;
            continue;
        }
        return outcome;
    }
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| EngineError::Internal {
            message: format!("system clock before epoch: {e}"),
        })?
        .as_secs())
}

impl Orchestrator {
    pub fn new(
        config: EngineConfig,
        matches: Arc<dyn MatchDataProvider>,
        collectors: Vec<Arc<dyn Collector>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            matches,
            collectors,
        })
    }

    /// Run one refresh cycle over the scope.
    pub async fn run(
        &self,
        db: &mut StrengthDatabase,
        scope: &RefreshScope,
    ) -> Result<RefreshReport> {
        let started = Instant::now();
        let season = self.config.season;

        let parameters: Vec<Parameter> = if scope.parameters.is_empty() {
            Parameter::ALL.to_vec()
        } else {
            scope.parameters.clone()
        };
        let selected: Vec<Arc<dyn Collector>> = self
            .collectors
            .iter()
            .filter(|c| parameters.contains(&c.parameter()))
            .cloned()
            .collect();

        let competitions = self.resolve_competitions(db, scope, season).await?;
        let mut failed_competitions = Vec::new();
        let mut live = Vec::new();
        for competition in competitions {
            match self.sync_competition(db, &competition).await {
                Ok(()) => live.push(competition),
                Err(reason) => {
                    eprintln!("sync failed for {}: {reason}", competition.name);
                    failed_competitions.push(competition.name.clone());
                }
            }
        }

        let (results, deferred) = self.collect(db, &live, &selected).await?;

        let mut stats: BTreeMap<Parameter, ParameterStats> = parameters
            .iter()
            .map(|p| (*p, ParameterStats::default()))
            .collect();
        for result in results {
            let entry = stats.entry(result.parameter).or_default();
            entry.attempted += 1;
            match result.outcome {
                CollectorOutcome::Value(value) => {
                    db.upsert_raw_value(
                        result.team_id,
                        result.competition_id,
                        result.parameter,
                        value,
                    )?;
                    entry.succeeded += 1;
                }
                CollectorOutcome::Unavailable { permanent: true, .. } => {
                    entry.permanent_failures += 1;
                }
                CollectorOutcome::Unavailable { .. } => {
                    entry.transient_failures += 1;
                }
            }
        }

        self.normalize(db, &live, &parameters)?;
        self.aggregate_and_derive(db, &live)?;
        self.recompute_european(db, season)?;

        let mut coverage = Vec::new();
        for competition in &live {
            coverage.push(db.competition_coverage(competition)?);
        }

        Ok(RefreshReport {
            season,
            parameters: stats,
            competitions: coverage,
            failed_competitions,
            deferred,
            wall_secs: started.elapsed().as_secs_f64(),
            cycle_end: now_secs()?,
        })
    }

    /// Resolve scope names to stored competitions, discovering unknown ones
    /// through the provider.
    async fn resolve_competitions(
        &self,
        db: &mut StrengthDatabase,
        scope: &RefreshScope,
        season: Season,
    ) -> Result<Vec<Competition>> {
        if scope.competitions.is_empty() {
            let all = db.list_competitions(Some(season))?;
            if all.is_empty() {
                return Err(EngineError::Config {
                    message: format!(
                        "no competitions stored for season {season}; name one to discover it"
                    ),
                });
            }
            return Ok(all);
        }

        let retry = &self.config.collector.retry;
        let mut out = Vec::new();
        for name in &scope.competitions {
            if let Some(competition) = db.competition_by_name(name, season)? {
                out.push(competition);
                continue;
            }
            let info = provider_with_retry(retry, || self.matches.competition_info(name, season))
                .await
                .map_err(|_| EngineError::CompetitionNotFound { name: name.clone() })?;
            let id = db.upsert_competition(
                &info.name,
                &info.country,
                info.kind,
                season,
                info.tier,
                info.external_id.as_deref(),
            )?;
            let competition = db.get_competition(id)?.ok_or_else(|| EngineError::Internal {
                message: format!("competition {name} vanished after upsert"),
            })?;
            out.push(competition);
        }
        Ok(out)
    }

    /// Sync the team list and recent fixtures for one competition.
    async fn sync_competition(
        &self,
        db: &mut StrengthDatabase,
        competition: &Competition,
    ) -> std::result::Result<(), String> {
        let retry = &self.config.collector.retry;
        let teams = provider_with_retry(retry, || {
            self.matches
                .competition_teams(&competition.name, competition.season)
        })
        .await
        .map_err(|e| e.to_string())?;

        let mut by_name: HashMap<String, TeamId> = HashMap::new();
        for team in &teams {
            let team_id = db
                .upsert_team(
                    &team.name,
                    team.confederation.as_deref(),
                    team.external_id.as_deref(),
                )
                .map_err(|e| e.to_string())?;
            db.ensure_membership(team_id, competition.competition_id)
                .map_err(|e| e.to_string())?;
            by_name.insert(team.name.to_lowercase(), team_id);
        }

        // Persist the fixtures we can see; the odds engine's pairwise
        // head-to-head refinement reads them back at query time.
        for team in &teams {
            let fixtures = match self
                .matches
                .recent_fixtures(
                    &team.name,
                    &competition.name,
                    competition.season,
                    SCORING_WINDOW * 2,
                )
                .await
            {
                Ok(fixtures) => fixtures,
                // Collection will surface the failure per parameter.
                Err(_) => continue,
            };
            for fixture in fixtures {
                let (Some(home), Some(away)) = (
                    by_name.get(&fixture.home_team.to_lowercase()),
                    by_name.get(&fixture.away_team.to_lowercase()),
                ) else {
                    continue;
                };
                db.upsert_match(&StoredMatch {
                    fixture_id: crate::cli::types::FixtureId::new(fixture.fixture_id),
                    competition_id: competition.competition_id,
                    home_team_id: *home,
                    away_team_id: *away,
                    kickoff: fixture.kickoff.clone(),
                    home_goals: fixture.home_goals,
                    away_goals: fixture.away_goals,
                    status: fixture.status,
                })
                .map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }

    /// Fan collection out over bounded per-provider pools and gather the
    /// outcomes. Raw writes happen after all tasks finish, so the
    /// normalization snapshot is stable.
    async fn collect(
        &self,
        db: &mut StrengthDatabase,
        competitions: &[Competition],
        collectors: &[Arc<dyn Collector>],
    ) -> Result<(Vec<TaskResult>, u32)> {
        let permits = self.config.collector.concurrency_per_provider;
        let mut pools: HashMap<String, Arc<Semaphore>> = HashMap::new();
        for collector in collectors {
            pools
                .entry(collector.provider_name().to_string())
                .or_insert_with(|| Arc::new(Semaphore::new(permits)));
        }

        let retry = self.config.collector.retry.clone();
        let call_timeout = Duration::from_secs(self.config.collector.call_timeout_secs);

        let mut handles = Vec::new();
        for competition in competitions {
            let members: Vec<Team> = db.members_of(competition.competition_id)?;
            for team in members {
                for collector in collectors {
                    let ctx = CollectContext {
                        team: team.clone(),
                        competition: competition.clone(),
                    };
                    let collector = collector.clone();
                    let pool = pools[collector.provider_name()].clone();
                    let retry = retry.clone();
                    handles.push(tokio::spawn(async move {
                        let _permit = match pool.acquire_owned().await {
                            Ok(permit) => permit,
                            Err(_) => {
                                return TaskResult {
                                    team_id: ctx.team.team_id,
                                    competition_id: ctx.competition.competition_id,
                                    parameter: collector.parameter(),
                                    outcome: CollectorOutcome::Unavailable {
                                        permanent: false,
                                        reason: "provider pool closed".to_string(),
                                    },
                                }
                            }
                        };
                        let outcome =
                            collect_with_retry(collector.as_ref(), &ctx, &retry, call_timeout)
                                .await;
                        TaskResult {
                            team_id: ctx.team.team_id,
                            competition_id: ctx.competition.competition_id,
                            parameter: collector.parameter(),
                            outcome,
                        }
                    }));
                }
            }
        }

        let deadline = self
            .config
            .collector
            .cycle_timeout_secs
            .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));

        let mut results = Vec::new();
        let mut deferred = 0u32;
        let mut expired = false;
        let abort_handles: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();
        for (index, handle) in handles.into_iter().enumerate() {
            if expired {
                abort_handles[index].abort();
                deferred += 1;
                continue;
            }
            let joined = match deadline {
                Some(at) => match tokio::time::timeout_at(at, handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        // Cycle deadline: abandon in-flight work; no partial
                        // rows have been written.
                        expired = true;
                        abort_handles[index].abort();
                        deferred += 1;
                        continue;
                    }
                },
                None => handle.await,
            };
            match joined {
                Ok(result) => results.push(result),
                Err(err) if err.is_cancelled() => deferred += 1,
                Err(err) => {
                    return Err(EngineError::Internal {
                        message: format!("collector task failed: {err}"),
                    })
                }
            }
        }
        Ok((results, deferred))
    }

    /// Min-max rescale every selected (competition, parameter) over the
    /// post-collection snapshot. The rescale itself is pure CPU and fans out
    /// across scopes.
    fn normalize(
        &self,
        db: &mut StrengthDatabase,
        competitions: &[Competition],
        parameters: &[Parameter],
    ) -> Result<()> {
        let mut jobs = Vec::new();
        for competition in competitions {
            for parameter in parameters {
                let snapshot = db.raw_values_for(competition.competition_id, *parameter)?;
                jobs.push((competition.competition_id, *parameter, snapshot));
            }
        }

        let normalized: Vec<(CompetitionId, Parameter, Vec<(TeamId, Option<f64>)>)> = jobs
            .into_par_iter()
            .map(|(competition_id, parameter, snapshot)| {
                let values = min_max(&snapshot, parameter.orientation());
                (competition_id, parameter, values)
            })
            .collect();

        for (competition_id, parameter, values) in normalized {
            db.write_normalized(competition_id, parameter, &values)?;
        }
        Ok(())
    }

    /// Aggregate overall strength per team, then rescale within each
    /// competition for the local-league variant.
    fn aggregate_and_derive(
        &self,
        db: &mut StrengthDatabase,
        competitions: &[Competition],
    ) -> Result<()> {
        for competition in competitions {
            let members = db.members_of(competition.competition_id)?;
            let mut overalls: Vec<(TeamId, Option<f64>)> = Vec::new();
            for team in &members {
                let normalized = db.normalized_map(team.team_id, competition.competition_id)?;
                let result = aggregate(
                    &normalized,
                    &self.config.weights,
                    self.config.partial_coverage_policy,
                );
                db.write_strength(
                    team.team_id,
                    competition.competition_id,
                    result.strength,
                    Some(result.confidence),
                )?;
                overalls.push((team.team_id, result.strength));
            }

            let local = min_max(&overalls, Orientation::HigherIsBetter);
            for (team_id, value) in local {
                db.write_local_strength(team_id, competition.competition_id, value)?;
            }
        }
        Ok(())
    }

    /// Recompute european strength: per-parameter normalization over the
    /// union of all domestic-league competitions in the season, then the
    /// usual aggregation.
    fn recompute_european(&self, db: &mut StrengthDatabase, season: Season) -> Result<()> {
        let clubs = db.club_competitions(season)?;
        if clubs.is_empty() {
            return Ok(());
        }

        let mut per_record: HashMap<(CompetitionId, TeamId), BTreeMap<Parameter, Option<f64>>> =
            HashMap::new();
        for parameter in Parameter::ALL {
            let mut union: Vec<((CompetitionId, TeamId), Option<f64>)> = Vec::new();
            for competition in &clubs {
                for (team_id, raw) in db.raw_values_for(competition.competition_id, parameter)? {
                    union.push(((competition.competition_id, team_id), raw));
                }
            }
            for (key, value) in min_max(&union, parameter.orientation()) {
                per_record.entry(key).or_default().insert(parameter, value);
            }
        }

        for ((competition_id, team_id), normalized) in per_record {
            let result = aggregate(
                &normalized,
                &self.config.weights,
                self.config.partial_coverage_policy,
            );
            db.write_european_strength(team_id, competition_id, result.strength)?;
        }
        Ok(())
    }
}
