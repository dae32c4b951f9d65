use std::fs;
use std::path::PathBuf;

use footbot::error::FetchError;
use footbot::stats_fetch::{
    parse_form_json, parse_leagues_json, parse_live_json, parse_prediction_json, parse_squad_json,
    parse_standings_json, parse_teams_json,
};
use footbot::tables::Outcome;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_leagues_fixture() {
    let raw = read_fixture("leagues.json");
    let leagues = parse_leagues_json(&raw).expect("fixture should parse");
    assert_eq!(leagues.len(), 3);
    assert_eq!(leagues[0].name, "Premier League");
    assert_eq!(leagues[0].id, 39);
    assert_eq!(leagues[1].name, "La Liga");
    assert_eq!(leagues[1].id, 140);
}

#[test]
fn parses_teams_fixture() {
    let raw = read_fixture("teams.json");
    let teams = parse_teams_json(&raw).expect("fixture should parse");
    assert_eq!(teams.len(), 3);
    assert_eq!(teams[0].name, "Arsenal");
    assert_eq!(teams[0].id, 42);
    assert_eq!(teams[2].name, "Liverpool");
    assert_eq!(teams[2].id, 40);
}

#[test]
fn parses_standings_fixture_in_rank_order() {
    let raw = read_fixture("standings.json");
    let rows = parse_standings_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].position, 1);
    assert_eq!(rows[0].team, "Liverpool");
    assert_eq!(rows[0].played, 38);
    assert_eq!(rows[0].won, 25);
    assert_eq!(rows[0].drawn, 9);
    assert_eq!(rows[0].lost, 4);
    assert_eq!(rows[0].points, 84);
    assert!(rows.windows(2).all(|pair| pair[0].position < pair[1].position));
}

#[test]
fn empty_standings_are_not_a_transport_error() {
    let raw = read_fixture("standings_empty.json");
    let err = parse_standings_json(&raw).expect_err("empty response should not parse");
    assert!(matches!(err, FetchError::NoStandings));
}

#[test]
fn form_scorelines_put_own_goals_first() {
    let raw = read_fixture("fixtures_form.json");
    let rows = parse_form_json(&raw, "Arsenal").expect("fixture should parse");
    // The postponed fixture has no goals and drops out.
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].opponent, "Chelsea");
    assert_eq!(rows[0].scoreline, "2:1");
    assert_eq!(rows[0].outcome, Outcome::Win);

    assert_eq!(rows[1].opponent, "Liverpool");
    assert_eq!(rows[1].scoreline, "1:1");
    assert_eq!(rows[1].outcome, Outcome::Draw);

    // Away defeat: own goals still come first in the scoreline.
    assert_eq!(rows[2].opponent, "Manchester City");
    assert_eq!(rows[2].scoreline, "0:3");
    assert_eq!(rows[2].outcome, Outcome::Loss);
}

#[test]
fn form_seen_from_the_other_side_flips_the_scoreline() {
    let raw = read_fixture("fixtures_form.json");
    let rows = parse_form_json(&raw, "Chelsea").expect("fixture should parse");
    // Chelsea only appears in one of the fixtures; the rest are skipped.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].opponent, "Arsenal");
    assert_eq!(rows[0].scoreline, "1:2");
    assert_eq!(rows[0].outcome, Outcome::Loss);
}

#[test]
fn squad_missing_fields_stay_absent() {
    let raw = read_fixture("squad.json");
    let rows = parse_squad_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].name, "David Raya");
    assert_eq!(rows[0].position, "Goalkeeper");
    assert_eq!(rows[0].number, Some(22));
    assert_eq!(rows[0].age, Some(29));

    let prospect = rows
        .iter()
        .find(|row| row.name == "Chido Obi")
        .expect("row without number or age");
    assert_eq!(prospect.number, None);
    assert_eq!(prospect.age, None);
    assert_eq!(prospect.position, "Attacker");
}

#[test]
fn live_rows_default_missing_goals_to_zero() {
    let raw = read_fixture("fixtures_live.json");
    let rows = parse_live_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].fixture_id, 1035101);
    assert_eq!(rows[0].label, "Arsenal vs Chelsea");
    assert_eq!(rows[0].score, "2:0");
    assert_eq!(rows[0].status, "2H");
    assert_eq!(rows[0].elapsed, Some(67));

    assert_eq!(rows[1].label, "Bournemouth vs Liverpool");
    assert_eq!(rows[1].score, "0:1");
    assert_eq!(rows[1].status, "HT");
    assert_eq!(rows[1].elapsed, None);
}

#[test]
fn prediction_drops_poisson_and_scales_percentages() {
    let raw = read_fixture("predictions.json");
    let table = parse_prediction_json(&raw).expect("fixture should parse");
    assert_eq!(table.home_team, "Liverpool");
    assert_eq!(table.away_team, "Arsenal");
    assert_eq!(table.metrics.len(), 6);
    assert!(table.metrics.iter().all(|m| m.name != "poisson_distribution"));

    let form = table
        .metrics
        .iter()
        .find(|m| m.name == "form")
        .expect("form metric");
    assert!((form.home - 0.55).abs() < 1e-9);
    assert!((form.away - 0.45).abs() < 1e-9);

    assert!(
        table
            .metrics
            .iter()
            .all(|m| (0.0..=1.0).contains(&m.home) && (0.0..=1.0).contains(&m.away))
    );
}

#[test]
fn missing_prediction_entry_is_its_own_condition() {
    let err = parse_prediction_json(r#"{"errors": [], "response": []}"#)
        .expect_err("empty response should not parse");
    assert!(matches!(err, FetchError::NoPrediction));
}

#[test]
fn in_band_api_error_fails_the_fetch() {
    let raw = read_fixture("errors.json");
    let err = parse_teams_json(&raw).expect_err("error body should not parse");
    let FetchError::Failed { reason } = err else {
        panic!("expected Failed, got {err:?}");
    };
    assert!(reason.contains("application key"));
}
