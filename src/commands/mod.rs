//! Command implementations for the footy-odds CLI.
//!
//! The read commands are the query surface: side-effect-free and safe under
//! concurrent callers; only `refresh` writes.

pub mod coverage;
pub mod odds;
pub mod refresh;
pub mod strength;
pub mod teams;

use crate::error::{EngineError, Result};
use crate::storage::models::Team;
use crate::storage::StrengthDatabase;

/// Resolve a team by name, surfacing not-found and ambiguity as typed
/// errors instead of guessing.
pub(crate) fn resolve_team(db: &StrengthDatabase, name: &str) -> Result<Team> {
    let mut candidates = db.find_teams_by_name(name)?;
    match candidates.len() {
        0 => Err(EngineError::TeamNotFound {
            name: name.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(EngineError::AmbiguousTeam {
            name: name.to_string(),
            candidates: candidates.into_iter().map(|t| t.name).collect(),
        }),
    }
}

/// Round decimal odds at the response boundary; probabilities stay full
/// precision.
pub(crate) fn round_odds(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn format_timestamp(secs: u64) -> String {
    format!("@{secs}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StrengthDatabase;

    fn db_with(names: &[&str]) -> StrengthDatabase {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut db = StrengthDatabase { conn };
        db.initialize_schema().unwrap();
        for name in names {
            db.upsert_team(name, None, None).unwrap();
        }
        db
    }

    #[test]
    fn resolve_team_exact() {
        let db = db_with(&["Inter", "Inter Miami"]);
        assert_eq!(resolve_team(&db, "Inter").unwrap().name, "Inter");
    }

    #[test]
    fn resolve_team_not_found() {
        let db = db_with(&["Inter"]);
        assert!(matches!(
            resolve_team(&db, "Ghost").unwrap_err(),
            EngineError::TeamNotFound { .. }
        ));
    }

    #[test]
    fn resolve_team_ambiguous() {
        let db = db_with(&["Inter Turku", "Inter Miami"]);
        match resolve_team(&db, "Inter").unwrap_err() {
            EngineError::AmbiguousTeam { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected ambiguity, got {other}"),
        }
    }

    #[test]
    fn odds_round_to_two_places() {
        assert_eq!(round_odds(3.134328), 3.13);
        assert_eq!(round_odds(3.136), 3.14);
    }
}
