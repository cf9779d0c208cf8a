//! Coverage and freshness reporting

use super::{models::*, schema::StrengthDatabase};
use crate::cli::types::{Parameter, Season};
use anyhow::Result;
use rusqlite::params;
use std::collections::BTreeMap;

impl StrengthDatabase {
    /// Coverage for one competition: non-null raw counts per parameter and
    /// the oldest/newest write timestamps.
    pub fn competition_coverage(&self, competition: &Competition) -> Result<CompetitionCoverage> {
        let team_count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM team_competitions WHERE competition_id = ?",
            params![competition.competition_id.as_i64()],
            |row| row.get(0),
        )?;

        let mut filled: BTreeMap<Parameter, u32> =
            Parameter::ALL.iter().map(|p| (*p, 0)).collect();
        let mut stmt = self.conn.prepare(
            "SELECT parameter, COUNT(raw_value)
             FROM parameter_values
             WHERE competition_id = ? AND raw_value IS NOT NULL
             GROUP BY parameter",
        )?;
        let rows = stmt.query_map(params![competition.competition_id.as_i64()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        for row in rows {
            let (key, count) = row?;
            if let Ok(parameter) = key.parse::<Parameter>() {
                filled.insert(parameter, count);
            }
        }

        let (oldest, newest): (Option<u64>, Option<u64>) = self.conn.query_row(
            "SELECT MIN(updated_at), MAX(updated_at)
             FROM parameter_values WHERE competition_id = ?",
            params![competition.competition_id.as_i64()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let cells = team_count as u64 * Parameter::ALL.len() as u64;
        let filled_cells: u64 = filled.values().map(|c| *c as u64).sum();
        let coverage = if cells == 0 {
            0.0
        } else {
            filled_cells as f64 / cells as f64
        };

        Ok(CompetitionCoverage {
            competition: competition.name.clone(),
            season: competition.season,
            team_count,
            filled,
            coverage,
            oldest_update: oldest,
            newest_update: newest,
        })
    }

    /// Coverage for every competition in a season.
    pub fn season_coverage(&self, season: Season) -> Result<Vec<CompetitionCoverage>> {
        let competitions = self.list_competitions(Some(season))?;
        competitions
            .iter()
            .map(|c| self.competition_coverage(c))
            .collect()
    }
}
