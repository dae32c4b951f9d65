//! The conversation state machine. Free text is classified against the
//! catalogs and a fixed menu vocabulary, each recognized input runs at most
//! one fetch and one render, and the answers come back as plain values for
//! the gateway to deliver.

use std::path::PathBuf;

use log::{debug, warn};

use crate::catalog::{LeagueCatalog, TeamCatalog};
use crate::error::{ActionError, FetchError, RenderError};
use crate::render;
use crate::stats_fetch::{FORM_FIXTURES, StatsProvider, season_year};

pub const MENU_LEAGUE: &[&str] = &["Table", "Team", "Matches on-air", "Match comparison"];
pub const MENU_TEAM: &[&str] = &["Players", "Last 10 matches"];

pub const WELCOME: &str =
    "Welcome to the Analytics Football Bot! Please specify league that you want to discover:";
const LEAGUE_PROMPT: &str = "What do you want to know?";
const TEAM_PROMPT: &str = "What do you want to know about team?";
const MATCH_ID_PROMPT: &str = "Please, enter match id:";
const UNRECOGNIZED: &str = "You have entered smth wrong :(";

/// Keyboard accompanying a text reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    None,
    /// Custom keyboard, one button per row.
    Keyboard(&'static [&'static str]),
    /// Remove whatever keyboard is showing.
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text { body: String, markup: Markup },
    Photo { path: PathBuf },
}

impl Reply {
    fn text(body: impl Into<String>) -> Self {
        Reply::Text {
            body: body.into(),
            markup: Markup::None,
        }
    }

    fn menu(body: impl Into<String>, keys: &'static [&'static str]) -> Self {
        Reply::Text {
            body: body.into(),
            markup: Markup::Keyboard(keys),
        }
    }

    fn clearing(body: impl Into<String>) -> Self {
        Reply::Text {
            body: body.into(),
            markup: Markup::Clear,
        }
    }

    fn photo(path: PathBuf) -> Self {
        Reply::Photo { path }
    }
}

/// Conversation state of one chat. League and team travel together in a
/// single tagged value, so a selected team always carries the league it
/// belongs to and the team catalog it was picked from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Idle,
    LeagueSelected {
        league: String,
        league_id: u32,
        teams: TeamCatalog,
    },
    TeamSelected {
        league: String,
        league_id: u32,
        teams: TeamCatalog,
        team: String,
        team_id: u32,
    },
}

impl Session {
    pub fn league(&self) -> Option<(&str, u32)> {
        match self {
            Session::Idle => None,
            Session::LeagueSelected {
                league, league_id, ..
            }
            | Session::TeamSelected {
                league, league_id, ..
            } => Some((league, *league_id)),
        }
    }

    pub fn team(&self) -> Option<(&str, u32)> {
        match self {
            Session::TeamSelected { team, team_id, .. } => Some((team, *team_id)),
            _ => None,
        }
    }

    fn teams(&self) -> Option<&TeamCatalog> {
        match self {
            Session::Idle => None,
            Session::LeagueSelected { teams, .. } | Session::TeamSelected { teams, .. } => {
                Some(teams)
            }
        }
    }
}

/// What one message turned out to be. First match wins; the order is the
/// contract and is covered by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Start,
    League(String),
    Table,
    TeamPrompt,
    LiveMatches,
    ComparisonPrompt,
    Fixture(u64),
    Team(String),
    Players,
    Form,
    Unrecognized,
}

pub struct Controller<P> {
    provider: P,
    leagues: LeagueCatalog,
    images_dir: PathBuf,
}

impl<P: StatsProvider> Controller<P> {
    pub fn new(provider: P, leagues: LeagueCatalog, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            leagues,
            images_dir: images_dir.into(),
        }
    }

    /// Handle one message. Errors never escape: every failure becomes an
    /// apology plus the menu for wherever the conversation already was.
    pub fn handle(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        let input = classify(&self.leagues, session, text);
        debug!("classified {text:?} as {input:?}");
        match self.dispatch(session, input) {
            Ok(replies) => replies,
            Err(err) => {
                warn!("action failed: {err}");
                vec![Reply::text(apology(&err)), menu_reply(session)]
            }
        }
    }

    fn dispatch(&self, session: &mut Session, input: Input) -> Result<Vec<Reply>, ActionError> {
        match input {
            Input::Start => Ok(vec![welcome()]),
            Input::League(name) => self.select_league(session, name),
            Input::Table => self.league_table(session),
            Input::TeamPrompt => self.prompt_team(session),
            Input::LiveMatches => self.live_matches(session),
            Input::ComparisonPrompt => Ok(vec![Reply::clearing(MATCH_ID_PROMPT)]),
            Input::Fixture(id) => self.fixture_comparison(session, id),
            Input::Team(name) => self.select_team(session, name),
            Input::Players => self.team_players(session),
            Input::Form => self.team_form(session),
            Input::Unrecognized => Ok(vec![Reply::text(UNRECOGNIZED), welcome()]),
        }
    }

    /// Selecting the league already in scope is a no-op that must not hit
    /// the network again. A different league loads its team catalog first
    /// and only then commits, so a failed load leaves the session as it was.
    fn select_league(&self, session: &mut Session, name: String) -> Result<Vec<Reply>, ActionError> {
        let league_id = self.leagues.get(&name).ok_or(ActionError::NoLeague)?;
        let same = session
            .league()
            .map(|(current, _)| current == name)
            .unwrap_or(false);
        let teams = if same {
            session.teams().cloned().unwrap_or_default()
        } else {
            TeamCatalog::load(&self.provider, league_id, season_year())?
        };
        *session = Session::LeagueSelected {
            league: name,
            league_id,
            teams,
        };
        Ok(vec![Reply::menu(LEAGUE_PROMPT, MENU_LEAGUE)])
    }

    fn league_table(&self, session: &Session) -> Result<Vec<Reply>, ActionError> {
        let (_, league_id) = session.league().ok_or(ActionError::NoLeague)?;
        let rows = self.provider.standings(league_id, season_year())?;
        let path = render::standings(&rows, &self.images_dir)?;
        Ok(vec![
            Reply::photo(path),
            Reply::menu(LEAGUE_PROMPT, MENU_LEAGUE),
        ])
    }

    fn prompt_team(&self, session: &Session) -> Result<Vec<Reply>, ActionError> {
        let (league, _) = session.league().ok_or(ActionError::NoLeague)?;
        Ok(vec![Reply::clearing(format!(
            "What team of the league {league} do you want to discover?"
        ))])
    }

    fn live_matches(&self, session: &Session) -> Result<Vec<Reply>, ActionError> {
        let (_, league_id) = session.league().ok_or(ActionError::NoLeague)?;
        let rows = self.provider.live_matches(league_id)?;
        if rows.is_empty() {
            return Err(ActionError::Render(RenderError::EmptyTable));
        }
        Ok(vec![
            Reply::text(render::matches_text(&rows)),
            Reply::menu(LEAGUE_PROMPT, MENU_LEAGUE),
        ])
    }

    /// Fires in any state; that is how the original behaved and ids arrive
    /// from the live matches list, which the user may have requested in an
    /// earlier league. Afterwards the conversation re-enters the league
    /// menu when one is selected.
    fn fixture_comparison(
        &self,
        session: &Session,
        fixture_id: u64,
    ) -> Result<Vec<Reply>, ActionError> {
        let table = self.provider.prediction(fixture_id)?;
        let (path, legend) = render::prediction_rose(&table, &self.images_dir)?;
        let follow_up = match session.league() {
            Some(_) => Reply::menu(LEAGUE_PROMPT, MENU_LEAGUE),
            None => welcome(),
        };
        Ok(vec![Reply::photo(path), Reply::text(legend), follow_up])
    }

    fn select_team(&self, session: &mut Session, name: String) -> Result<Vec<Reply>, ActionError> {
        let (league, league_id, teams) = match session {
            Session::LeagueSelected {
                league,
                league_id,
                teams,
            }
            | Session::TeamSelected {
                league,
                league_id,
                teams,
                ..
            } => (league.clone(), *league_id, teams.clone()),
            Session::Idle => return Err(ActionError::NoLeague),
        };
        let team_id = teams.get(&name).ok_or(ActionError::NoTeam)?;
        *session = Session::TeamSelected {
            league,
            league_id,
            teams,
            team: name,
            team_id,
        };
        Ok(vec![Reply::menu(TEAM_PROMPT, MENU_TEAM)])
    }

    fn team_players(&self, session: &Session) -> Result<Vec<Reply>, ActionError> {
        let (_, team_id) = session.team().ok_or(ActionError::NoTeam)?;
        let rows = self.provider.squad(team_id)?;
        let path = render::squad(&rows, &self.images_dir)?;
        Ok(vec![Reply::photo(path), Reply::menu(TEAM_PROMPT, MENU_TEAM)])
    }

    fn team_form(&self, session: &Session) -> Result<Vec<Reply>, ActionError> {
        let (team, team_id) = session.team().ok_or(ActionError::NoTeam)?;
        let rows = self.provider.team_form(team_id, team, FORM_FIXTURES)?;
        let path = render::form(&rows, &self.images_dir)?;
        Ok(vec![Reply::photo(path), Reply::menu(TEAM_PROMPT, MENU_TEAM)])
    }
}

fn classify(leagues: &LeagueCatalog, session: &Session, text: &str) -> Input {
    if text == "/start" {
        return Input::Start;
    }
    if leagues.contains(text) {
        return Input::League(text.to_string());
    }
    match text {
        "Table" => return Input::Table,
        "Team" => return Input::TeamPrompt,
        "Matches on-air" => return Input::LiveMatches,
        "Match comparison" => return Input::ComparisonPrompt,
        _ => {}
    }
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        // Digit strings too long for a fixture id fall through to nothing.
        return match text.parse::<u64>() {
            Ok(id) => Input::Fixture(id),
            Err(_) => Input::Unrecognized,
        };
    }
    if let Some(teams) = session.teams() {
        if teams.contains(text) {
            return Input::Team(text.to_string());
        }
    }
    match text {
        "Players" => Input::Players,
        "Last 10 matches" => Input::Form,
        _ => Input::Unrecognized,
    }
}

fn welcome() -> Reply {
    Reply::clearing(WELCOME)
}

/// The menu belonging to wherever the conversation currently is.
fn menu_reply(session: &Session) -> Reply {
    match session {
        Session::Idle => welcome(),
        Session::LeagueSelected { .. } => Reply::menu(LEAGUE_PROMPT, MENU_LEAGUE),
        Session::TeamSelected { .. } => Reply::menu(TEAM_PROMPT, MENU_TEAM),
    }
}

fn apology(err: &ActionError) -> &'static str {
    match err {
        ActionError::Fetch(FetchError::NoStandings) => "No standings found for this league :(",
        ActionError::Fetch(FetchError::NoPrediction) => {
            "No prediction available for this match :("
        }
        ActionError::Render(RenderError::EmptyTable) => "Nothing to show for that right now :(",
        ActionError::Render(_) => "Could not draw the image, please try again :(",
        ActionError::NoLeague => "Please choose a league first :(",
        ActionError::NoTeam => "Please choose a team first :(",
        ActionError::Fetch(FetchError::Failed { .. }) | ActionError::Catalog(_) => {
            "Something went wrong while fetching the data, please try again :("
        }
    }
}
