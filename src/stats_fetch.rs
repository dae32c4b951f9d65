//! Remote statistics API. One fetch operation per data need, each a single
//! GET turned into a normalized table. Parsing is split into pure
//! `parse_*_json` functions so the wire shapes can be tested from captured
//! fixtures without a network.

use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::API_HOST;
use crate::error::FetchError;
use crate::http_client::http_client;
use crate::tables::{
    ComparisonMetric, FormRow, LiveMatchRow, Outcome, PredictionTable, SquadRow, StandingsRow,
};

const API_BASE: &str = "https://api-football-v1.p.rapidapi.com/v3";

/// How many recent fixtures make up a team's form table.
pub const FORM_FIXTURES: u8 = 10;

/// Season the API is queried for. The provider keeps the previous season
/// complete on the free tier, so that is what the bot serves.
pub fn season_year() -> i32 {
    Utc::now().year() - 1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueEntry {
    pub name: String,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamEntry {
    pub name: String,
    pub id: u32,
}

/// The seam between the conversation controller and the remote API. Every
/// operation is read-only and idempotent; repeating a call may return
/// fresher data but has no side effects.
pub trait StatsProvider {
    fn leagues(&self) -> Result<Vec<LeagueEntry>, FetchError>;
    fn teams(&self, league_id: u32, season: i32) -> Result<Vec<TeamEntry>, FetchError>;
    fn standings(&self, league_id: u32, season: i32) -> Result<Vec<StandingsRow>, FetchError>;
    fn team_form(
        &self,
        team_id: u32,
        team_name: &str,
        last: u8,
    ) -> Result<Vec<FormRow>, FetchError>;
    fn squad(&self, team_id: u32) -> Result<Vec<SquadRow>, FetchError>;
    fn live_matches(&self, league_id: u32) -> Result<Vec<LiveMatchRow>, FetchError>;
    fn prediction(&self, fixture_id: u64) -> Result<PredictionTable, FetchError>;
}

/// API-Football client (RapidAPI edition): static key and host headers over
/// the shared blocking client.
#[derive(Debug, Clone)]
pub struct ApiFootball {
    api_key: String,
}

impl ApiFootball {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    fn get(&self, path: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let client = http_client().map_err(|err| FetchError::failed(err.to_string()))?;
        let url = format!("{API_BASE}/{path}");
        let resp = client
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", API_HOST)
            .query(params)
            .send()
            .map_err(|err| FetchError::failed(format!("{path} request failed: {err}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| FetchError::failed(format!("{path} body read failed: {err}")))?;
        if !status.is_success() {
            let reason = api_error_message(&body).unwrap_or_else(|| format!("http {status}"));
            return Err(FetchError::failed(format!("{path}: {reason}")));
        }
        Ok(body)
    }
}

impl StatsProvider for ApiFootball {
    fn leagues(&self) -> Result<Vec<LeagueEntry>, FetchError> {
        let body = self.get("leagues", &[])?;
        parse_leagues_json(&body)
    }

    fn teams(&self, league_id: u32, season: i32) -> Result<Vec<TeamEntry>, FetchError> {
        let body = self.get(
            "teams",
            &[
                ("league", league_id.to_string()),
                ("season", season.to_string()),
            ],
        )?;
        parse_teams_json(&body)
    }

    fn standings(&self, league_id: u32, season: i32) -> Result<Vec<StandingsRow>, FetchError> {
        let body = self.get(
            "standings",
            &[
                ("league", league_id.to_string()),
                ("season", season.to_string()),
            ],
        )?;
        parse_standings_json(&body)
    }

    fn team_form(
        &self,
        team_id: u32,
        team_name: &str,
        last: u8,
    ) -> Result<Vec<FormRow>, FetchError> {
        let body = self.get(
            "fixtures",
            &[("team", team_id.to_string()), ("last", last.to_string())],
        )?;
        parse_form_json(&body, team_name)
    }

    fn squad(&self, team_id: u32) -> Result<Vec<SquadRow>, FetchError> {
        let body = self.get("players/squads", &[("team", team_id.to_string())])?;
        parse_squad_json(&body)
    }

    fn live_matches(&self, league_id: u32) -> Result<Vec<LiveMatchRow>, FetchError> {
        // The live filter takes an id range; a single league is "id-id".
        let body = self.get("fixtures", &[("live", format!("{league_id}-{league_id}"))])?;
        parse_live_json(&body)
    }

    fn prediction(&self, fixture_id: u64) -> Result<PredictionTable, FetchError> {
        let body = self.get("predictions", &[("fixture", fixture_id.to_string())])?;
        parse_prediction_json(&body)
    }
}

// -- Wire shapes ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    errors: Value,
    #[serde(default = "Vec::new")]
    response: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct LeagueWrap {
    league: LeagueMeta,
}

#[derive(Debug, Deserialize)]
struct LeagueMeta {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TeamWrap {
    team: TeamMeta,
}

#[derive(Debug, Deserialize)]
struct TeamMeta {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct StandingsWrap {
    league: StandingsLeague,
}

#[derive(Debug, Deserialize)]
struct StandingsLeague {
    #[serde(default)]
    standings: Vec<Vec<StandingsEntry>>,
}

#[derive(Debug, Deserialize)]
struct StandingsEntry {
    rank: u32,
    team: TeamMeta,
    points: i32,
    all: StandingsTotals,
}

#[derive(Debug, Deserialize)]
struct StandingsTotals {
    played: u32,
    win: u32,
    draw: u32,
    lose: u32,
}

// -- Parsers ------------------------------------------------------------------

pub fn parse_leagues_json(raw: &str) -> Result<Vec<LeagueEntry>, FetchError> {
    let rows: Vec<LeagueWrap> = parse_envelope(raw, "leagues")?;
    Ok(rows
        .into_iter()
        .map(|wrap| LeagueEntry {
            name: wrap.league.name,
            id: wrap.league.id,
        })
        .collect())
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<TeamEntry>, FetchError> {
    let rows: Vec<TeamWrap> = parse_envelope(raw, "teams")?;
    Ok(rows
        .into_iter()
        .map(|wrap| TeamEntry {
            name: wrap.team.name,
            id: wrap.team.id,
        })
        .collect())
}

/// The standings payload nests the table twice: one entry per league, then
/// one group per stage. The bot serves the first group of the first entry.
pub fn parse_standings_json(raw: &str) -> Result<Vec<StandingsRow>, FetchError> {
    let wraps: Vec<StandingsWrap> = parse_envelope(raw, "standings")?;
    let Some(wrap) = wraps.into_iter().next() else {
        return Err(FetchError::NoStandings);
    };
    let Some(group) = wrap.league.standings.into_iter().next() else {
        return Err(FetchError::NoStandings);
    };
    let rows: Vec<StandingsRow> = group
        .into_iter()
        .map(|entry| StandingsRow {
            position: entry.rank,
            team: entry.team.name,
            played: entry.all.played,
            won: entry.all.win,
            drawn: entry.all.draw,
            lost: entry.all.lose,
            points: entry.points,
        })
        .collect();
    if rows.is_empty() {
        return Err(FetchError::NoStandings);
    }
    Ok(rows)
}

/// Keeps only fixtures the named team actually finished: unplayed games have
/// null goals and drop out, as does anything the team was not part of.
pub fn parse_form_json(raw: &str, team_name: &str) -> Result<Vec<FormRow>, FetchError> {
    let fixtures = parse_response_array(raw, "fixtures")?;
    Ok(fixtures
        .iter()
        .filter_map(|fixture| form_row(fixture, team_name))
        .collect())
}

fn form_row(fixture: &Value, team_name: &str) -> Option<FormRow> {
    let teams = fixture.get("teams")?;
    let home = teams.get("home")?.get("name")?.as_str()?;
    let away = teams.get("away")?.get("name")?.as_str()?;
    let goals = fixture.get("goals")?;
    let home_goals = goals.get("home")?.as_u64()?;
    let away_goals = goals.get("away")?.as_u64()?;

    let (own, opponent_goals, opponent) = if team_name == home {
        (home_goals, away_goals, away)
    } else if team_name == away {
        (away_goals, home_goals, home)
    } else {
        return None;
    };

    let scoreline = format!("{own}:{opponent_goals}");
    let outcome = Outcome::from_scoreline(&scoreline)?;
    Some(FormRow {
        opponent: opponent.to_string(),
        scoreline,
        outcome,
    })
}

pub fn parse_squad_json(raw: &str) -> Result<Vec<SquadRow>, FetchError> {
    let entries = parse_response_array(raw, "squad")?;
    let Some(first) = entries.first() else {
        return Ok(Vec::new());
    };
    let mut rows = Vec::new();
    let Some(players) = first.get("players").and_then(Value::as_array) else {
        return Ok(rows);
    };
    for player in players {
        let name = player
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        rows.push(SquadRow {
            number: player.get("number").and_then(Value::as_u64).map(|n| n as u32),
            position: player
                .get("position")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            name: name.to_string(),
            age: player.get("age").and_then(Value::as_u64).map(|n| n as u32),
        });
    }
    Ok(rows)
}

pub fn parse_live_json(raw: &str) -> Result<Vec<LiveMatchRow>, FetchError> {
    let entries = parse_response_array(raw, "live fixtures")?;
    Ok(entries.iter().filter_map(live_row).collect())
}

fn live_row(entry: &Value) -> Option<LiveMatchRow> {
    let fixture = entry.get("fixture")?;
    let fixture_id = fixture.get("id")?.as_u64()?;
    let teams = entry.get("teams")?;
    let home = teams.get("home")?.get("name")?.as_str()?;
    let away = teams.get("away")?.get("name")?.as_str()?;
    let home_goals = entry
        .get("goals")
        .and_then(|goals| goals.get("home"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let away_goals = entry
        .get("goals")
        .and_then(|goals| goals.get("away"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let status = fixture.get("status");
    Some(LiveMatchRow {
        fixture_id,
        label: format!("{home} vs {away}"),
        score: format!("{home_goals}:{away_goals}"),
        status: status
            .and_then(|s| s.get("short"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        elapsed: status
            .and_then(|s| s.get("elapsed"))
            .and_then(Value::as_u64)
            .map(|m| m as u32),
    })
}

/// The comparison block is a map of metric name to `{home, away}` percent
/// strings. The poisson entry is an internal of the provider's model and is
/// dropped; everything else becomes a `[0, 1]` pair.
pub fn parse_prediction_json(raw: &str) -> Result<PredictionTable, FetchError> {
    let entries = parse_response_array(raw, "predictions")?;
    let Some(first) = entries.first() else {
        return Err(FetchError::NoPrediction);
    };

    let mut metrics = Vec::new();
    if let Some(comparison) = first.get("comparison").and_then(Value::as_object) {
        for (name, sides) in comparison {
            if name == "poisson_distribution" {
                continue;
            }
            let Some(home) = sides
                .get("home")
                .and_then(Value::as_str)
                .and_then(parse_percent)
            else {
                continue;
            };
            let Some(away) = sides
                .get("away")
                .and_then(Value::as_str)
                .and_then(parse_percent)
            else {
                continue;
            };
            metrics.push(ComparisonMetric {
                name: name.clone(),
                home,
                away,
            });
        }
    }

    Ok(PredictionTable {
        home_team: side_name(first, "home"),
        away_team: side_name(first, "away"),
        metrics,
    })
}

// -- Envelope handling -------------------------------------------------------

fn parse_envelope<T: DeserializeOwned>(raw: &str, what: &str) -> Result<Vec<T>, FetchError> {
    let envelope: Envelope<T> = serde_json::from_str(raw)
        .map_err(|err| FetchError::failed(format!("invalid {what} json: {err}")))?;
    if let Some(message) = error_field_message(&envelope.errors) {
        return Err(FetchError::failed(format!("{what}: {message}")));
    }
    Ok(envelope.response)
}

fn parse_response_array(raw: &str, what: &str) -> Result<Vec<Value>, FetchError> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|err| FetchError::failed(format!("invalid {what} json: {err}")))?;
    if let Some(message) = root.get("errors").and_then(error_field_message) {
        return Err(FetchError::failed(format!("{what}: {message}")));
    }
    Ok(root
        .get("response")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

/// The API reports errors inside a 200 body as often as not. The field is an
/// empty array when all is well, and either an array of objects or a map of
/// messages when it is not.
fn error_field_message(errors: &Value) -> Option<String> {
    match errors {
        Value::Array(items) => items.iter().find_map(|item| {
            item.get("message")
                .and_then(Value::as_str)
                .or_else(|| item.as_str())
                .map(str::to_string)
        }),
        Value::Object(map) if !map.is_empty() => map
            .values()
            .find_map(|v| v.as_str().map(str::to_string))
            .or_else(|| Some("api error".to_string())),
        _ => None,
    }
}

fn api_error_message(body: &str) -> Option<String> {
    let root: Value = serde_json::from_str(body).ok()?;
    root.get("errors").and_then(error_field_message)
}

fn side_name(entry: &Value, side: &str) -> String {
    entry
        .get("teams")
        .and_then(|teams| teams.get(side))
        .and_then(|team| team.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// "55%" to 0.55. Every comparison value the API writes looks like this.
fn parse_percent(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .ok()
        .map(|v| v / 100.0)
}
