//! REST adapter for the match/statistics provider.
//!
//! Several collectors consume the same recent-fixtures list within one
//! refresh cycle, so that endpoint sits behind a small LRU cache.

use super::http::get_json;
use super::{
    MatchDataProvider, ProviderConfig, ProviderFixture, ProviderResult, ProviderTeam, StandingRow,
};
use crate::cli::types::Season;
use async_trait::async_trait;
use lru::LruCache;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::sync::Mutex;

const FIXTURE_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Deserialize)]
struct RatingPayload {
    elo: f64,
}

pub struct FootballApiProvider {
    config: ProviderConfig,
    fixture_cache: Mutex<LruCache<String, Vec<ProviderFixture>>>,
}

impl FootballApiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            fixture_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(FIXTURE_CACHE_CAPACITY).expect("non-zero capacity"),
            )),
        }
    }
}

#[async_trait]
impl MatchDataProvider for FootballApiProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn competition_info(
        &self,
        competition: &str,
        season: Season,
    ) -> ProviderResult<super::ProviderCompetition> {
        get_json(
            &self.config,
            &format!("/competitions/{competition}"),
            &[("season", season.to_string())],
        )
        .await
    }

    async fn competition_teams(
        &self,
        competition: &str,
        season: Season,
    ) -> ProviderResult<Vec<ProviderTeam>> {
        get_json(
            &self.config,
            &format!("/competitions/{competition}/teams"),
            &[("season", season.to_string())],
        )
        .await
    }

    async fn team_rating(&self, team: &str) -> ProviderResult<f64> {
        let payload: RatingPayload =
            get_json(&self.config, &format!("/teams/{team}/rating"), &[]).await?;
        Ok(payload.elo)
    }

    async fn recent_fixtures(
        &self,
        team: &str,
        competition: &str,
        season: Season,
        limit: usize,
    ) -> ProviderResult<Vec<ProviderFixture>> {
        let cache_key = format!("{team}|{competition}|{season}|{limit}");
        if let Some(hit) = self.fixture_cache.lock().unwrap().get(&cache_key) {
            return Ok(hit.clone());
        }

        let fixtures: Vec<ProviderFixture> = get_json(
            &self.config,
            &format!("/teams/{team}/fixtures"),
            &[
                ("competition", competition.to_string()),
                ("season", season.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?;

        self.fixture_cache
            .lock()
            .unwrap()
            .put(cache_key, fixtures.clone());
        Ok(fixtures)
    }

    async fn standings(
        &self,
        competition: &str,
        season: Season,
    ) -> ProviderResult<Vec<StandingRow>> {
        get_json(
            &self.config,
            &format!("/competitions/{competition}/standings"),
            &[("season", season.to_string())],
        )
        .await
    }
}
