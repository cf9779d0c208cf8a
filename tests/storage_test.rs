//! Integration tests for the storage layer on a real database file.

use footy_odds::cli::types::{FixtureId, Parameter, Season};
use footy_odds::storage::models::{CompetitionKind, MatchStatus, StoredMatch};
use footy_odds::storage::StrengthDatabase;

#[test]
fn values_survive_reopen_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strength.db");
    let season = Season::new(2025);
    let raw = 987_654.321_098_765_4_f64;

    let (team_id, competition_id) = {
        let mut db = StrengthDatabase::open_at(&path).unwrap();
        let competition_id = db
            .upsert_competition(
                "Premier League",
                "England",
                CompetitionKind::DomesticLeague,
                season,
                Some(1),
                None,
            )
            .unwrap();
        let team_id = db.upsert_team("Arsenal", Some("UEFA"), None).unwrap();
        db.ensure_membership(team_id, competition_id).unwrap();
        db.upsert_raw_value(team_id, competition_id, Parameter::SquadValue, raw)
            .unwrap();
        db.write_strength(team_id, competition_id, Some(0.75), Some(1.0))
            .unwrap();
        (team_id, competition_id)
    };

    let db = StrengthDatabase::open_at(&path).unwrap();
    let record = db.team_record(team_id, competition_id).unwrap().unwrap();
    assert_eq!(record.team.name, "Arsenal");
    assert_eq!(
        record.raw[&Parameter::SquadValue].unwrap().to_bits(),
        raw.to_bits()
    );
    assert_eq!(record.overall_strength, Some(0.75));
}

#[test]
fn fixture_upsert_is_unique_by_external_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = StrengthDatabase::open_at(&dir.path().join("strength.db")).unwrap();
    let season = Season::new(2025);

    let competition_id = db
        .upsert_competition(
            "La Liga",
            "Spain",
            CompetitionKind::DomesticLeague,
            season,
            Some(1),
            None,
        )
        .unwrap();
    let home = db.upsert_team("Girona", None, None).unwrap();
    let away = db.upsert_team("Betis", None, None).unwrap();
    db.ensure_membership(home, competition_id).unwrap();
    db.ensure_membership(away, competition_id).unwrap();

    let scheduled = StoredMatch {
        fixture_id: FixtureId::new(777),
        competition_id,
        home_team_id: home,
        away_team_id: away,
        kickoff: "2025-10-04".to_string(),
        home_goals: None,
        away_goals: None,
        status: MatchStatus::Scheduled,
    };
    db.upsert_match(&scheduled).unwrap();

    // Same fixture id arrives again, now finished.
    let finished = StoredMatch {
        home_goals: Some(2),
        away_goals: Some(2),
        status: MatchStatus::Finished,
        ..scheduled
    };
    db.upsert_match(&finished).unwrap();

    let meetings = db.head_to_head(home, away, 10).unwrap();
    assert_eq!(meetings.len(), 1);
    assert_eq!(meetings[0].home_goals, Some(2));
}

#[test]
fn team_names_are_unique_and_stable() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = StrengthDatabase::open_at(&dir.path().join("strength.db")).unwrap();

    let first = db.upsert_team("Porto", None, Some("fc-porto")).unwrap();
    let second = db.upsert_team("Porto", Some("UEFA"), None).unwrap();
    assert_eq!(first, second);

    let found = db.find_teams_by_name("porto").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].provider_ref.as_deref(), Some("fc-porto"));
    assert_eq!(found[0].confederation.as_deref(), Some("UEFA"));
}
