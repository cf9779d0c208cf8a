//! Unit tests for storage functionality

use super::*;
use crate::cli::types::{FixtureId, Parameter, Season, TeamId};

fn create_test_db() -> StrengthDatabase {
    // Create in-memory database for testing
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let mut db = StrengthDatabase { conn };
    db.initialize_schema().unwrap();
    db
}

fn seed_competition(db: &mut StrengthDatabase) -> (crate::cli::types::CompetitionId, Vec<TeamId>) {
    let season = Season::new(2025);
    let comp = db
        .upsert_competition("Serie A", "Italy", CompetitionKind::DomesticLeague, season, Some(1), None)
        .unwrap();
    let teams = ["Inter", "Juventus", "Napoli"]
        .iter()
        .map(|name| {
            let id = db.upsert_team(name, Some("UEFA"), None).unwrap();
            db.ensure_membership(id, comp).unwrap();
            id
        })
        .collect();
    (comp, teams)
}

#[test]
fn upsert_team_is_stable_across_repeats() {
    let mut db = create_test_db();
    let first = db.upsert_team("Inter", None, None).unwrap();
    let second = db.upsert_team("Inter", Some("UEFA"), Some("fc-inter")).unwrap();
    assert_eq!(first, second);

    let team = db.get_team(first).unwrap().unwrap();
    assert_eq!(team.confederation.as_deref(), Some("UEFA"));
    assert_eq!(team.provider_ref.as_deref(), Some("fc-inter"));
}

#[test]
fn raw_value_round_trip_is_bit_exact() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    let value = 1_234.567_890_123_456_7_f64;
    db.upsert_raw_value(teams[0], comp, Parameter::Elo, value).unwrap();

    let raw = db.raw_map(teams[0], comp).unwrap();
    assert_eq!(raw[&Parameter::Elo], Some(value));
    assert_eq!(raw[&Parameter::Form], None);
}

#[test]
fn raw_upsert_overwrites_and_touches_timestamp() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    db.upsert_raw_value(teams[0], comp, Parameter::Elo, 1500.0).unwrap();
    db.upsert_raw_value(teams[0], comp, Parameter::Elo, 1600.0).unwrap();

    let raw = db.raw_map(teams[0], comp).unwrap();
    assert_eq!(raw[&Parameter::Elo], Some(1600.0));

    let record = db.team_record(teams[0], comp).unwrap().unwrap();
    assert!(record.last_updated > 0);
}

#[test]
fn raw_values_for_includes_teams_without_values() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    db.upsert_raw_value(teams[0], comp, Parameter::Elo, 1600.0).unwrap();
    db.upsert_raw_value(teams[1], comp, Parameter::Elo, 1500.0).unwrap();

    let snapshot = db.raw_values_for(comp, Parameter::Elo).unwrap();
    assert_eq!(snapshot.len(), 3);
    let missing = snapshot.iter().find(|(id, _)| *id == teams[2]).unwrap();
    assert_eq!(missing.1, None);
}

#[test]
fn write_normalized_leaves_null_rows_null() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    db.upsert_raw_value(teams[0], comp, Parameter::Elo, 1600.0).unwrap();
    db.upsert_raw_value(teams[1], comp, Parameter::Elo, 1400.0).unwrap();

    db.write_normalized(
        comp,
        Parameter::Elo,
        &[(teams[0], Some(1.0)), (teams[1], Some(0.0)), (teams[2], None)],
    )
    .unwrap();

    assert_eq!(db.normalized_map(teams[0], comp).unwrap()[&Parameter::Elo], Some(1.0));
    assert_eq!(db.normalized_map(teams[1], comp).unwrap()[&Parameter::Elo], Some(0.0));
    assert_eq!(db.normalized_map(teams[2], comp).unwrap()[&Parameter::Elo], None);
}

#[test]
fn normalized_write_preserves_raw() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    db.upsert_raw_value(teams[0], comp, Parameter::Form, 7.29).unwrap();
    db.write_normalized(comp, Parameter::Form, &[(teams[0], Some(0.5))]).unwrap();

    let raw = db.raw_map(teams[0], comp).unwrap();
    assert_eq!(raw[&Parameter::Form], Some(7.29));
}

#[test]
fn strength_fields_round_trip() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    db.write_strength(teams[0], comp, Some(0.6857), Some(0.7)).unwrap();
    db.write_local_strength(teams[0], comp, Some(1.0)).unwrap();
    db.write_european_strength(teams[0], comp, Some(0.81)).unwrap();

    let record = db.team_record(teams[0], comp).unwrap().unwrap();
    assert_eq!(record.overall_strength, Some(0.6857));
    assert_eq!(record.confidence, Some(0.7));
    assert_eq!(record.local_strength, Some(1.0));
    assert_eq!(record.european_strength, Some(0.81));
    assert_eq!(record.overall_percent(), Some(68.57));
}

#[test]
fn find_teams_exact_beats_substring() {
    let mut db = create_test_db();
    db.upsert_team("Inter", None, None).unwrap();
    db.upsert_team("Inter Miami", None, None).unwrap();

    let exact = db.find_teams_by_name("inter").unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].name, "Inter");

    let fuzzy = db.find_teams_by_name("Mia").unwrap();
    assert_eq!(fuzzy.len(), 1);
    assert_eq!(fuzzy[0].name, "Inter Miami");
}

#[test]
fn team_directory_groups_competitions() {
    let mut db = create_test_db();
    let season = Season::new(2025);
    let league = db
        .upsert_competition("Serie A", "Italy", CompetitionKind::DomesticLeague, season, Some(1), None)
        .unwrap();
    let cup = db
        .upsert_competition("Coppa", "Italy", CompetitionKind::DomesticLeague, season, None, None)
        .unwrap();
    let inter = db.upsert_team("Inter", None, None).unwrap();
    db.ensure_membership(inter, league).unwrap();
    db.ensure_membership(inter, cup).unwrap();

    let directory = db.team_directory(season, None).unwrap();
    assert_eq!(directory.len(), 1);
    assert_eq!(directory[0].competitions, vec!["Coppa", "Serie A"]);

    let filtered = db.team_directory(season, Some("Serie A")).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].competitions, vec!["Serie A"]);
}

#[test]
fn head_to_head_matches_both_orientations() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    for (id, home, away, hg, ag) in [
        (1, teams[0], teams[1], 2, 0),
        (2, teams[1], teams[0], 1, 1),
        (3, teams[0], teams[2], 3, 1),
    ] {
        db.upsert_match(&StoredMatch {
            fixture_id: FixtureId::new(id),
            competition_id: comp,
            home_team_id: home,
            away_team_id: away,
            kickoff: format!("2025-0{id}-01"),
            home_goals: Some(hg),
            away_goals: Some(ag),
            status: MatchStatus::Finished,
        })
        .unwrap();
    }

    let meetings = db.head_to_head(teams[0], teams[1], 10).unwrap();
    assert_eq!(meetings.len(), 2);
    // Most recent first.
    assert_eq!(meetings[0].fixture_id, FixtureId::new(2));
}

#[test]
fn unfinished_matches_are_excluded_from_h2h() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    db.upsert_match(&StoredMatch {
        fixture_id: FixtureId::new(9),
        competition_id: comp,
        home_team_id: teams[0],
        away_team_id: teams[1],
        kickoff: "2025-09-01".to_string(),
        home_goals: None,
        away_goals: None,
        status: MatchStatus::Scheduled,
    })
    .unwrap();

    assert!(db.head_to_head(teams[0], teams[1], 10).unwrap().is_empty());
}

#[test]
fn competition_coverage_counts_cells() {
    let mut db = create_test_db();
    let (comp, teams) = seed_competition(&mut db);

    db.upsert_raw_value(teams[0], comp, Parameter::Elo, 1600.0).unwrap();
    db.upsert_raw_value(teams[1], comp, Parameter::Elo, 1500.0).unwrap();
    db.upsert_raw_value(teams[0], comp, Parameter::Form, 9.0).unwrap();

    let competition = db.get_competition(comp).unwrap().unwrap();
    let coverage = db.competition_coverage(&competition).unwrap();
    assert_eq!(coverage.team_count, 3);
    assert_eq!(coverage.filled[&Parameter::Elo], 2);
    assert_eq!(coverage.filled[&Parameter::Form], 1);
    assert_eq!(coverage.filled[&Parameter::Motivation], 0);
    let expected = 3.0 / (3.0 * Parameter::ALL.len() as f64);
    assert!((coverage.coverage - expected).abs() < 1e-12);
    assert!(coverage.oldest_update.is_some());
}

#[test]
fn club_competitions_excludes_international() {
    let mut db = create_test_db();
    let season = Season::new(2025);
    db.upsert_competition("Serie A", "Italy", CompetitionKind::DomesticLeague, season, Some(1), None)
        .unwrap();
    db.upsert_competition("World Cup", "international", CompetitionKind::International, season, None, None)
        .unwrap();

    let clubs = db.club_competitions(season).unwrap();
    assert_eq!(clubs.len(), 1);
    assert_eq!(clubs[0].name, "Serie A");
}
