//! Database schema and connection management

use crate::error::EngineError;
use anyhow::Result;
use dirs::cache_dir;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Database connection manager for strength data
pub struct StrengthDatabase {
    pub(crate) conn: Connection,
}

impl StrengthDatabase {
    /// Open the default database location and ensure tables exist.
    pub fn new() -> Result<Self> {
        let db_path = Self::database_path()?;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_at(&db_path)
    }

    /// Open a database at an explicit path (used by `--db` and tests).
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Get the path to the database file
    fn database_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(crate::DB_ENV_VAR) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let cache_dir = cache_dir().ok_or_else(|| EngineError::Storage {
            message: "Could not determine cache directory".to_string(),
        })?;
        Ok(cache_dir.join("footy-odds").join("strength.db"))
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        // Row-level integrity between teams, competitions and memberships.
        self.conn.execute_batch("PRAGMA foreign_keys = ON")?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS teams (
                team_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                confederation TEXT,
                provider_ref TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS competitions (
                competition_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                country TEXT NOT NULL,
                kind TEXT NOT NULL,
                season INTEGER NOT NULL,
                tier INTEGER,
                provider_ref TEXT,
                UNIQUE (name, season)
            )",
            [],
        )?;

        // One row per (team, competition); the competition row carries the
        // season, so this is the (team, competition, season) triple.
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS team_competitions (
                team_id INTEGER NOT NULL,
                competition_id INTEGER NOT NULL,
                overall_strength REAL,
                local_strength REAL,
                european_strength REAL,
                confidence REAL,
                last_updated INTEGER NOT NULL,
                PRIMARY KEY (team_id, competition_id),
                FOREIGN KEY (team_id) REFERENCES teams(team_id),
                FOREIGN KEY (competition_id) REFERENCES competitions(competition_id)
            )",
            [],
        )?;

        // Raw values are preserved as written; normalized values are derived
        // and recomputed, null whenever raw is null.
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS parameter_values (
                team_id INTEGER NOT NULL,
                competition_id INTEGER NOT NULL,
                parameter TEXT NOT NULL,
                raw_value REAL,
                normalized_value REAL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (team_id, competition_id, parameter),
                FOREIGN KEY (team_id, competition_id)
                    REFERENCES team_competitions(team_id, competition_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS matches (
                fixture_id INTEGER PRIMARY KEY,
                competition_id INTEGER NOT NULL,
                home_team_id INTEGER NOT NULL,
                away_team_id INTEGER NOT NULL,
                kickoff TEXT NOT NULL,
                home_goals INTEGER,
                away_goals INTEGER,
                status TEXT NOT NULL,
                FOREIGN KEY (competition_id) REFERENCES competitions(competition_id),
                FOREIGN KEY (home_team_id) REFERENCES teams(team_id),
                FOREIGN KEY (away_team_id) REFERENCES teams(team_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_param_scope
             ON parameter_values(competition_id, parameter)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_match_pair
             ON matches(home_team_id, away_team_id)",
            [],
        )?;

        Ok(())
    }
}
