use image::Rgb;
use tempfile::TempDir;

use footbot::error::RenderError;
use footbot::render::{
    self, POINTS_HIGH, POINTS_LOW, outcome_color, position_color, standings_row_colors,
};
use footbot::tables::{
    ComparisonMetric, FormRow, LiveMatchRow, Outcome, PredictionTable, SquadRow, StandingsRow,
};

fn standings_row(position: u32, team: &str, points: i32) -> StandingsRow {
    StandingsRow {
        position,
        team: team.to_string(),
        played: 38,
        won: 20,
        drawn: 9,
        lost: 9,
        points,
    }
}

fn form_rows() -> Vec<FormRow> {
    vec![
        FormRow {
            opponent: "Chelsea".to_string(),
            scoreline: "2:1".to_string(),
            outcome: Outcome::Win,
        },
        FormRow {
            opponent: "Liverpool".to_string(),
            scoreline: "1:1".to_string(),
            outcome: Outcome::Draw,
        },
    ]
}

fn squad_rows() -> Vec<SquadRow> {
    vec![
        SquadRow {
            number: Some(22),
            position: "Goalkeeper".to_string(),
            name: "David Raya".to_string(),
            age: Some(29),
        },
        SquadRow {
            number: None,
            position: "Attacker".to_string(),
            name: "Chido Obi".to_string(),
            age: None,
        },
    ]
}

fn prediction_table() -> PredictionTable {
    PredictionTable {
        home_team: "Liverpool".to_string(),
        away_team: "Arsenal".to_string(),
        metrics: vec![
            ComparisonMetric {
                name: "form".to_string(),
                home: 0.55,
                away: 0.45,
            },
            ComparisonMetric {
                name: "att".to_string(),
                home: 0.60,
                away: 0.40,
            },
            ComparisonMetric {
                name: "def".to_string(),
                home: 0.48,
                away: 0.52,
            },
        ],
    }
}

#[test]
fn points_extremes_get_the_endpoint_colors() {
    let rows = vec![
        standings_row(1, "Leaders", 30),
        standings_row(2, "Middle", 20),
        standings_row(3, "Tail", 10),
        standings_row(4, "Chasers", 30),
    ];
    let colors = standings_row_colors(&rows);
    assert_eq!(colors[0], POINTS_HIGH);
    assert_eq!(colors[2], POINTS_LOW);
    // Tied points always share a color.
    assert_eq!(colors[0], colors[3]);
}

#[test]
fn position_colors_follow_the_fixed_lookup() {
    assert_eq!(position_color("Goalkeeper"), Rgb([205, 133, 63]));
    assert_eq!(position_color("Defender"), Rgb([144, 238, 144]));
    assert_eq!(position_color("Midfielder"), Rgb([255, 255, 224]));
    assert_eq!(position_color("Attacker"), Rgb([240, 128, 128]));
    assert_eq!(position_color("Coach"), Rgb([255, 255, 255]));
}

#[test]
fn outcome_colors_follow_the_fixed_lookup() {
    assert_eq!(outcome_color(Outcome::Win), Rgb([144, 238, 144]));
    assert_eq!(outcome_color(Outcome::Draw), Rgb([255, 255, 224]));
    assert_eq!(outcome_color(Outcome::Loss), Rgb([240, 128, 128]));
}

#[test]
fn matches_text_renders_the_documented_line() {
    assert_eq!(render::matches_text(&[]), "");
    let rows = vec![LiveMatchRow {
        fixture_id: 1,
        label: "A vs B".to_string(),
        score: "2:0".to_string(),
        status: "2H".to_string(),
        elapsed: Some(67),
    }];
    assert_eq!(render::matches_text(&rows), "1 - A vs B 2:0 (2H - 67m)\n");
}

#[test]
fn unknown_clock_renders_as_a_question_mark() {
    let rows = vec![LiveMatchRow {
        fixture_id: 2,
        label: "C vs D".to_string(),
        score: "0:0".to_string(),
        status: "HT".to_string(),
        elapsed: None,
    }];
    assert_eq!(render::matches_text(&rows), "2 - C vs D 0:0 (HT - ?m)\n");
}

#[test]
fn empty_tables_are_rejected_before_drawing() {
    let dir = TempDir::new().expect("temp images dir");
    assert!(matches!(
        render::standings(&[], dir.path()),
        Err(RenderError::EmptyTable)
    ));
    assert!(matches!(
        render::squad(&[], dir.path()),
        Err(RenderError::EmptyTable)
    ));
    assert!(matches!(
        render::form(&[], dir.path()),
        Err(RenderError::EmptyTable)
    ));
    let empty = PredictionTable {
        home_team: "A".to_string(),
        away_team: "B".to_string(),
        metrics: Vec::new(),
    };
    assert!(matches!(
        render::prediction_rose(&empty, dir.path()),
        Err(RenderError::EmptyTable)
    ));
}

#[test]
fn standings_image_lands_in_the_out_dir() {
    let dir = TempDir::new().expect("temp images dir");
    let rows = vec![
        standings_row(1, "Liverpool", 84),
        standings_row(2, "Arsenal", 74),
        standings_row(3, "Chelsea", 69),
    ];
    let path = render::standings(&rows, dir.path()).expect("standings should render");
    assert_eq!(path, dir.path().join("league_standings.png"));
    assert!(std::fs::metadata(&path).expect("image file").len() > 0);
}

#[test]
fn squad_and_form_images_use_their_fixed_names() {
    let dir = TempDir::new().expect("temp images dir");
    let squad = render::squad(&squad_rows(), dir.path()).expect("squad should render");
    assert_eq!(squad, dir.path().join("team_players.png"));
    let form = render::form(&form_rows(), dir.path()).expect("form should render");
    assert_eq!(form, dir.path().join("team_result.png"));
}

#[test]
fn rose_legend_names_each_side_color() {
    let dir = TempDir::new().expect("temp images dir");
    let (path, legend) =
        render::prediction_rose(&prediction_table(), dir.path()).expect("rose should render");
    assert_eq!(path, dir.path().join("predictions.png"));
    assert!(path.exists());
    assert_eq!(legend, "Liverpool - blue\nArsenal - orange");
}
