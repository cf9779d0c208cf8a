//! Motivation derived from league position relative to objectives.

use super::{CollectContext, Collector, CollectorOutcome};
use crate::cli::types::Parameter;
use crate::providers::{MatchDataProvider, StandingRow};
use async_trait::async_trait;
use std::sync::Arc;

/// Position percentile above which a side is in title contention.
const TITLE_ZONE: f64 = 0.75;
/// Position percentile below which a side is in the relegation battle.
const RELEGATION_ZONE: f64 = 0.15;

const BASELINE: f64 = 0.40;

pub struct MotivationCollector {
    provider: Arc<dyn MatchDataProvider>,
}

impl MotivationCollector {
    pub fn new(provider: Arc<dyn MatchDataProvider>) -> Self {
        Self { provider }
    }
}

/// Deterministic mapping from a standings snapshot. Title contenders and
/// relegation battlers are elevated above the mid-table baseline, scaling
/// with how deep into their zone they sit.
pub(crate) fn motivation_score(standings: &[StandingRow], team: &str) -> Option<f64> {
    let row = standings
        .iter()
        .find(|r| r.team.eq_ignore_ascii_case(team))?;
    let n = standings.len();
    if n < 2 {
        return Some(BASELINE);
    }

    // 1.0 at the top of the table, 0.0 at the bottom.
    let percentile = (n as f64 - row.position as f64) / (n as f64 - 1.0);

    let score = if percentile >= TITLE_ZONE {
        0.70 + 0.30 * (percentile - TITLE_ZONE) / (1.0 - TITLE_ZONE)
    } else if percentile <= RELEGATION_ZONE {
        0.60 + 0.20 * (RELEGATION_ZONE - percentile) / RELEGATION_ZONE
    } else {
        BASELINE
    };
    Some(score)
}

#[async_trait]
impl Collector for MotivationCollector {
    fn parameter(&self) -> Parameter {
        Parameter::Motivation
    }

    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn collect(&self, ctx: &CollectContext) -> CollectorOutcome {
        let standings = match self
            .provider
            .standings(&ctx.competition.name, ctx.competition.season)
            .await
        {
            Ok(rows) => rows,
            Err(err) => return err.into(),
        };
        match motivation_score(&standings, &ctx.team.name) {
            Some(score) => CollectorOutcome::validated(score),
            None => CollectorOutcome::missing("team absent from standings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: u32) -> Vec<StandingRow> {
        (1..=n)
            .map(|position| StandingRow {
                team: format!("T{position}"),
                position,
                played: 10,
                points: 30 - position,
            })
            .collect()
    }

    #[test]
    fn leader_gets_the_top_score() {
        let standings = table(20);
        assert_eq!(motivation_score(&standings, "T1"), Some(1.0));
    }

    #[test]
    fn bottom_side_is_fighting_for_survival() {
        let standings = table(20);
        let bottom = motivation_score(&standings, "T20").unwrap();
        assert!((bottom - 0.80).abs() < 1e-12);
    }

    #[test]
    fn mid_table_is_baseline() {
        let standings = table(20);
        assert_eq!(motivation_score(&standings, "T10"), Some(BASELINE));
    }

    #[test]
    fn title_zone_outranks_relegation_zone() {
        let standings = table(20);
        let second = motivation_score(&standings, "T2").unwrap();
        let nineteenth = motivation_score(&standings, "T19").unwrap();
        assert!(second > nineteenth);
        assert!(second > BASELINE);
        assert!(nineteenth > BASELINE);
    }

    #[test]
    fn unknown_team_is_none() {
        assert_eq!(motivation_score(&table(20), "Ghost"), None);
    }

    #[test]
    fn deterministic_from_snapshot() {
        let standings = table(18);
        let a = motivation_score(&standings, "T4").unwrap();
        let b = motivation_score(&standings, "T4").unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
