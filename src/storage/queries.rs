//! Basic database query operations

use super::{models::*, schema::StrengthDatabase};
use crate::cli::types::{CompetitionId, FixtureId, Parameter, Season, TeamId};
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

impl StrengthDatabase {
    /// Insert a team on first observation, or refresh its optional fields.
    /// Returns the stable team id. Teams are never deleted.
    pub fn upsert_team(
        &mut self,
        name: &str,
        confederation: Option<&str>,
        provider_ref: Option<&str>,
    ) -> Result<TeamId> {
        self.conn.execute(
            "INSERT INTO teams (name, confederation, provider_ref)
             VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                 confederation = COALESCE(excluded.confederation, confederation),
                 provider_ref = COALESCE(excluded.provider_ref, provider_ref)",
            params![name, confederation, provider_ref],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT team_id FROM teams WHERE name = ?",
            params![name],
            |row| row.get(0),
        )?;
        Ok(TeamId::new(id))
    }

    /// Resolve a team by name: case-insensitive exact match first, falling
    /// back to substring candidates for the caller to disambiguate.
    pub fn find_teams_by_name(&self, name: &str) -> Result<Vec<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT team_id, name, confederation, provider_ref
             FROM teams WHERE name = ? COLLATE NOCASE",
        )?;
        let exact: Vec<Team> = stmt
            .query_map(params![name], row_to_team)?
            .collect::<rusqlite::Result<_>>()?;
        if !exact.is_empty() {
            return Ok(exact);
        }

        let mut stmt = self.conn.prepare(
            "SELECT team_id, name, confederation, provider_ref
             FROM teams WHERE name LIKE ? ORDER BY name",
        )?;
        let fuzzy: Vec<Team> = stmt
            .query_map(params![format!("%{name}%")], row_to_team)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(fuzzy)
    }

    pub fn get_team(&self, team_id: TeamId) -> Result<Option<Team>> {
        let team = self
            .conn
            .query_row(
                "SELECT team_id, name, confederation, provider_ref
                 FROM teams WHERE team_id = ?",
                params![team_id.as_i64()],
                row_to_team,
            )
            .optional()?;
        Ok(team)
    }

    /// Create a (competition, season) scope, or refresh its metadata.
    pub fn upsert_competition(
        &mut self,
        name: &str,
        country: &str,
        kind: CompetitionKind,
        season: Season,
        tier: Option<u8>,
        provider_ref: Option<&str>,
    ) -> Result<CompetitionId> {
        self.conn.execute(
            "INSERT INTO competitions (name, country, kind, season, tier, provider_ref)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(name, season) DO UPDATE SET
                 country = excluded.country,
                 kind = excluded.kind,
                 tier = COALESCE(excluded.tier, tier),
                 provider_ref = COALESCE(excluded.provider_ref, provider_ref)",
            params![
                name,
                country,
                kind.as_str(),
                season.as_u16(),
                tier,
                provider_ref
            ],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT competition_id FROM competitions WHERE name = ? AND season = ?",
            params![name, season.as_u16()],
            |row| row.get(0),
        )?;
        Ok(CompetitionId::new(id))
    }

    pub fn get_competition(&self, competition_id: CompetitionId) -> Result<Option<Competition>> {
        let competition = self
            .conn
            .query_row(
                "SELECT competition_id, name, country, kind, season, tier, provider_ref
                 FROM competitions WHERE competition_id = ?",
                params![competition_id.as_i64()],
                row_to_competition,
            )
            .optional()?;
        Ok(competition)
    }

    pub fn competition_by_name(&self, name: &str, season: Season) -> Result<Option<Competition>> {
        let competition = self
            .conn
            .query_row(
                "SELECT competition_id, name, country, kind, season, tier, provider_ref
                 FROM competitions WHERE name = ? COLLATE NOCASE AND season = ?",
                params![name, season.as_u16()],
                row_to_competition,
            )
            .optional()?;
        Ok(competition)
    }

    pub fn list_competitions(&self, season: Option<Season>) -> Result<Vec<Competition>> {
        let mut out = Vec::new();
        match season {
            Some(s) => {
                let mut stmt = self.conn.prepare(
                    "SELECT competition_id, name, country, kind, season, tier, provider_ref
                     FROM competitions WHERE season = ? ORDER BY name",
                )?;
                let rows = stmt.query_map(params![s.as_u16()], row_to_competition)?;
                for row in rows {
                    out.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT competition_id, name, country, kind, season, tier, provider_ref
                     FROM competitions ORDER BY season, name",
                )?;
                let rows = stmt.query_map([], row_to_competition)?;
                for row in rows {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }

    /// Domestic-league competitions in a season: the normalization scope for
    /// european strength.
    pub fn club_competitions(&self, season: Season) -> Result<Vec<Competition>> {
        let mut stmt = self.conn.prepare(
            "SELECT competition_id, name, country, kind, season, tier, provider_ref
             FROM competitions WHERE season = ? AND kind = 'domestic-league'
             ORDER BY name",
        )?;
        let rows = stmt.query_map(params![season.as_u16()], row_to_competition)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Create the team-in-competition record if it does not exist yet.
    pub fn ensure_membership(&mut self, team_id: TeamId, competition_id: CompetitionId) -> Result<()> {
        let now = now_secs()?;
        self.conn.execute(
            "INSERT OR IGNORE INTO team_competitions
                 (team_id, competition_id, last_updated)
             VALUES (?, ?, ?)",
            params![team_id.as_i64(), competition_id.as_i64(), now],
        )?;
        Ok(())
    }

    pub fn members_of(&self, competition_id: CompetitionId) -> Result<Vec<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.team_id, t.name, t.confederation, t.provider_ref
             FROM teams t
             JOIN team_competitions tc ON tc.team_id = t.team_id
             WHERE tc.competition_id = ?
             ORDER BY t.name",
        )?;
        let rows = stmt.query_map(params![competition_id.as_i64()], row_to_team)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Write one raw parameter value. The row is written atomically and the
    /// record's last_updated advances; the previous raw value is overwritten
    /// only by this call, never by failures.
    pub fn upsert_raw_value(
        &mut self,
        team_id: TeamId,
        competition_id: CompetitionId,
        parameter: Parameter,
        value: f64,
    ) -> Result<()> {
        let now = now_secs()?;
        self.ensure_membership(team_id, competition_id)?;
        self.conn.execute(
            "INSERT INTO parameter_values
                 (team_id, competition_id, parameter, raw_value, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(team_id, competition_id, parameter) DO UPDATE SET
                 raw_value = excluded.raw_value,
                 updated_at = excluded.updated_at",
            params![
                team_id.as_i64(),
                competition_id.as_i64(),
                parameter.key(),
                value,
                now
            ],
        )?;
        self.conn.execute(
            "UPDATE team_competitions SET last_updated = ?
             WHERE team_id = ? AND competition_id = ?",
            params![now, team_id.as_i64(), competition_id.as_i64()],
        )?;
        Ok(())
    }

    /// All member teams of a competition with their raw value for one
    /// parameter; teams with no value yet appear as null. This is the
    /// normalization snapshot input.
    pub fn raw_values_for(
        &self,
        competition_id: CompetitionId,
        parameter: Parameter,
    ) -> Result<Vec<(TeamId, Option<f64>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT tc.team_id, pv.raw_value
             FROM team_competitions tc
             LEFT JOIN parameter_values pv
                 ON pv.team_id = tc.team_id
                 AND pv.competition_id = tc.competition_id
                 AND pv.parameter = ?
             WHERE tc.competition_id = ?
             ORDER BY tc.team_id",
        )?;
        let rows = stmt.query_map(
            params![parameter.key(), competition_id.as_i64()],
            |row| Ok((TeamId::new(row.get(0)?), row.get::<_, Option<f64>>(1)?)),
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Bulk-write normalized values for one (competition, parameter). Only
    /// rows that hold a raw value are touched; null stays null.
    pub fn write_normalized(
        &mut self,
        competition_id: CompetitionId,
        parameter: Parameter,
        values: &[(TeamId, Option<f64>)],
    ) -> Result<()> {
        let now = now_secs()?;
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE parameter_values
                 SET normalized_value = ?, updated_at = ?
                 WHERE team_id = ? AND competition_id = ? AND parameter = ?",
            )?;
            for (team_id, normalized) in values {
                stmt.execute(params![
                    normalized,
                    now,
                    team_id.as_i64(),
                    competition_id.as_i64(),
                    parameter.key()
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// The normalized parameter map for one team-in-competition.
    pub fn normalized_map(
        &self,
        team_id: TeamId,
        competition_id: CompetitionId,
    ) -> Result<BTreeMap<Parameter, Option<f64>>> {
        self.parameter_map(team_id, competition_id, "normalized_value")
    }

    pub fn raw_map(
        &self,
        team_id: TeamId,
        competition_id: CompetitionId,
    ) -> Result<BTreeMap<Parameter, Option<f64>>> {
        self.parameter_map(team_id, competition_id, "raw_value")
    }

    fn parameter_map(
        &self,
        team_id: TeamId,
        competition_id: CompetitionId,
        column: &str,
    ) -> Result<BTreeMap<Parameter, Option<f64>>> {
        let mut map: BTreeMap<Parameter, Option<f64>> =
            Parameter::ALL.iter().map(|p| (*p, None)).collect();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT parameter, {column} FROM parameter_values
             WHERE team_id = ? AND competition_id = ?"
        ))?;
        let rows = stmt.query_map(
            params![team_id.as_i64(), competition_id.as_i64()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?)),
        )?;
        for row in rows {
            let (key, value) = row?;
            if let Ok(parameter) = key.parse::<Parameter>() {
                map.insert(parameter, value);
            }
        }
        Ok(map)
    }

    /// Write the derived strength fields for one record.
    pub fn write_strength(
        &mut self,
        team_id: TeamId,
        competition_id: CompetitionId,
        overall: Option<f64>,
        confidence: Option<f64>,
    ) -> Result<()> {
        let now = now_secs()?;
        self.conn.execute(
            "UPDATE team_competitions
             SET overall_strength = ?, confidence = ?, last_updated = ?
             WHERE team_id = ? AND competition_id = ?",
            params![
                overall,
                confidence,
                now,
                team_id.as_i64(),
                competition_id.as_i64()
            ],
        )?;
        Ok(())
    }

    pub fn write_local_strength(
        &mut self,
        team_id: TeamId,
        competition_id: CompetitionId,
        value: Option<f64>,
    ) -> Result<()> {
        let now = now_secs()?;
        self.conn.execute(
            "UPDATE team_competitions SET local_strength = ?, last_updated = ?
             WHERE team_id = ? AND competition_id = ?",
            params![value, now, team_id.as_i64(), competition_id.as_i64()],
        )?;
        Ok(())
    }

    pub fn write_european_strength(
        &mut self,
        team_id: TeamId,
        competition_id: CompetitionId,
        value: Option<f64>,
    ) -> Result<()> {
        let now = now_secs()?;
        self.conn.execute(
            "UPDATE team_competitions SET european_strength = ?, last_updated = ?
             WHERE team_id = ? AND competition_id = ?",
            params![value, now, team_id.as_i64(), competition_id.as_i64()],
        )?;
        Ok(())
    }

    /// Assemble the full team-in-competition record.
    pub fn team_record(
        &self,
        team_id: TeamId,
        competition_id: CompetitionId,
    ) -> Result<Option<TeamRecord>> {
        let Some(team) = self.get_team(team_id)? else {
            return Ok(None);
        };
        let Some(competition) = self.get_competition(competition_id)? else {
            return Ok(None);
        };
        let row = self
            .conn
            .query_row(
                "SELECT overall_strength, local_strength, european_strength,
                        confidence, last_updated
                 FROM team_competitions
                 WHERE team_id = ? AND competition_id = ?",
                params![team_id.as_i64(), competition_id.as_i64()],
                |row| {
                    Ok((
                        row.get::<_, Option<f64>>(0)?,
                        row.get::<_, Option<f64>>(1)?,
                        row.get::<_, Option<f64>>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                        row.get::<_, u64>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((overall, local, european, confidence, last_updated)) = row else {
            return Ok(None);
        };

        Ok(Some(TeamRecord {
            raw: self.raw_map(team_id, competition_id)?,
            normalized: self.normalized_map(team_id, competition_id)?,
            team,
            competition_id,
            competition_name: competition.name,
            season: competition.season,
            overall_strength: overall,
            local_strength: local,
            european_strength: european,
            confidence,
            last_updated,
        }))
    }

    /// All records for one team in a season (a team can appear in several
    /// competitions).
    pub fn records_for_team(&self, team_id: TeamId, season: Season) -> Result<Vec<TeamRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT tc.competition_id
             FROM team_competitions tc
             JOIN competitions c ON c.competition_id = tc.competition_id
             WHERE tc.team_id = ? AND c.season = ?
             ORDER BY c.name",
        )?;
        let ids: Vec<i64> = stmt
            .query_map(params![team_id.as_i64(), season.as_u16()], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut out = Vec::new();
        for id in ids {
            if let Some(record) = self.team_record(team_id, CompetitionId::new(id))? {
                out.push(record);
            }
        }
        Ok(out)
    }

    /// Team directory, optionally restricted to one competition.
    pub fn team_directory(
        &self,
        season: Season,
        competition: Option<&str>,
    ) -> Result<Vec<TeamDirectoryEntry>> {
        let mut query = String::from(
            "SELECT t.team_id, t.name, t.confederation, c.name
             FROM teams t
             JOIN team_competitions tc ON tc.team_id = t.team_id
             JOIN competitions c ON c.competition_id = tc.competition_id
             WHERE c.season = ?",
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(season.as_u16())];
        if let Some(name) = competition {
            query.push_str(" AND c.name = ? COLLATE NOCASE");
            params.push(Box::new(name.to_string()));
        }
        query.push_str(" ORDER BY t.name, c.name");

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            |row| {
                Ok((
                    TeamId::new(row.get(0)?),
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )?;

        let mut out: Vec<TeamDirectoryEntry> = Vec::new();
        for row in rows {
            let (team_id, name, confederation, competition) = row?;
            match out.last_mut() {
                Some(entry) if entry.team_id == team_id => entry.competitions.push(competition),
                _ => out.push(TeamDirectoryEntry {
                    team_id,
                    name,
                    confederation,
                    competitions: vec![competition],
                }),
            }
        }
        Ok(out)
    }

    /// Upsert a fixture by external id.
    pub fn upsert_match(&mut self, fixture: &StoredMatch) -> Result<()> {
        self.conn.execute(
            "INSERT INTO matches
                 (fixture_id, competition_id, home_team_id, away_team_id,
                  kickoff, home_goals, away_goals, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(fixture_id) DO UPDATE SET
                 home_goals = excluded.home_goals,
                 away_goals = excluded.away_goals,
                 status = excluded.status",
            params![
                fixture.fixture_id.as_i64(),
                fixture.competition_id.as_i64(),
                fixture.home_team_id.as_i64(),
                fixture.away_team_id.as_i64(),
                fixture.kickoff,
                fixture.home_goals,
                fixture.away_goals,
                fixture.status.as_str()
            ],
        )?;
        Ok(())
    }

    /// Finished meetings between two teams, most recent first.
    pub fn head_to_head(&self, a: TeamId, b: TeamId, limit: u32) -> Result<Vec<StoredMatch>> {
        let mut stmt = self.conn.prepare(
            "SELECT fixture_id, competition_id, home_team_id, away_team_id,
                    kickoff, home_goals, away_goals, status
             FROM matches
             WHERE status = 'finished'
               AND ((home_team_id = ?1 AND away_team_id = ?2)
                 OR (home_team_id = ?2 AND away_team_id = ?1))
             ORDER BY kickoff DESC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![a.as_i64(), b.as_i64(), limit], row_to_match)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        team_id: TeamId::new(row.get(0)?),
        name: row.get(1)?,
        confederation: row.get(2)?,
        provider_ref: row.get(3)?,
    })
}

fn row_to_competition(row: &Row) -> rusqlite::Result<Competition> {
    let kind: String = row.get(3)?;
    Ok(Competition {
        competition_id: CompetitionId::new(row.get(0)?),
        name: row.get(1)?,
        country: row.get(2)?,
        kind: CompetitionKind::parse(&kind).unwrap_or(CompetitionKind::DomesticLeague),
        season: Season::new(row.get(4)?),
        tier: row.get(5)?,
        provider_ref: row.get(6)?,
    })
}

fn row_to_match(row: &Row) -> rusqlite::Result<StoredMatch> {
    let status: String = row.get(7)?;
    Ok(StoredMatch {
        fixture_id: FixtureId::new(row.get(0)?),
        competition_id: CompetitionId::new(row.get(1)?),
        home_team_id: TeamId::new(row.get(2)?),
        away_team_id: TeamId::new(row.get(3)?),
        kickoff: row.get(4)?,
        home_goals: row.get(5)?,
        away_goals: row.get(6)?,
        status: MatchStatus::parse(&status).unwrap_or(MatchStatus::Scheduled),
    })
}
