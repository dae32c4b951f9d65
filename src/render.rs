//! Table and chart images, drawn straight onto an RGB buffer with the 8x8
//! glyph set. The color assignments are the contract here; exact pixel
//! layout is not.

use std::f32::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};

use crate::error::RenderError;
use crate::tables::{
    ComparisonMetric, FormRow, LiveMatchRow, Outcome, PredictionTable, SquadRow, StandingsRow,
};

pub const STANDINGS_FILE: &str = "league_standings.png";
pub const SQUAD_FILE: &str = "team_players.png";
pub const FORM_FILE: &str = "team_result.png";
pub const PREDICTION_FILE: &str = "predictions.png";

/// Endpoints of the standings gradient: red for the fewest points, through
/// yellow, to green for the most.
pub const POINTS_LOW: Rgb<u8> = Rgb([255, 0, 0]);
pub const POINTS_MID: Rgb<u8> = Rgb([255, 255, 0]);
pub const POINTS_HIGH: Rgb<u8> = Rgb([0, 128, 0]);

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const HEADER_GREY: Rgb<u8> = Rgb([211, 211, 211]);
const GRID: Rgb<u8> = Rgb([120, 120, 120]);
const RING: Rgb<u8> = Rgb([200, 200, 200]);
const TEXT: Rgb<u8> = Rgb([15, 15, 15]);
const HOME_TRACE: Rgb<u8> = Rgb([51, 102, 255]);
const AWAY_TRACE: Rgb<u8> = Rgb([255, 179, 0]);

const GLYPH_W: u32 = 8;
const GLYPH_H: u32 = 8;
const TEXT_SCALE: u32 = 2;
const ROW_HEIGHT: u32 = 28;
const CELL_PAD_X: u32 = 12;

const ROSE_SIZE: u32 = 480;
const ROSE_RADIUS: f32 = 160.0;
const TRACE_FILL_ALPHA: f32 = 0.3;

// -- Color assignments --------------------------------------------------------

/// Linear red to yellow to green grade of a points value against the
/// table's spread. A table where every team has the same points lands in
/// the middle of the scale.
pub fn points_color(points: i32, min: i32, max: i32) -> Rgb<u8> {
    let t = if max > min {
        (points - min) as f32 / (max - min) as f32
    } else {
        0.5
    };
    if t < 0.5 {
        lerp(POINTS_LOW, POINTS_MID, t * 2.0)
    } else {
        lerp(POINTS_MID, POINTS_HIGH, (t - 0.5) * 2.0)
    }
}

/// Per-row background colors for a standings table, graded by points.
pub fn standings_row_colors(rows: &[StandingsRow]) -> Vec<Rgb<u8>> {
    let min = rows.iter().map(|row| row.points).min().unwrap_or(0);
    let max = rows.iter().map(|row| row.points).max().unwrap_or(0);
    rows.iter()
        .map(|row| points_color(row.points, min, max))
        .collect()
}

/// Fixed four-way position lookup; anything unmapped renders neutral.
pub fn position_color(position: &str) -> Rgb<u8> {
    match position {
        "Goalkeeper" => Rgb([205, 133, 63]),
        "Defender" => Rgb([144, 238, 144]),
        "Midfielder" => Rgb([255, 255, 224]),
        "Attacker" => Rgb([240, 128, 128]),
        _ => WHITE,
    }
}

pub fn outcome_color(outcome: Outcome) -> Rgb<u8> {
    match outcome {
        Outcome::Win => Rgb([144, 238, 144]),
        Outcome::Draw => Rgb([255, 255, 224]),
        Outcome::Loss => Rgb([240, 128, 128]),
    }
}

fn lerp(a: Rgb<u8>, b: Rgb<u8>, t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let chan = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb([
        chan(a.0[0], b.0[0]),
        chan(a.0[1], b.0[1]),
        chan(a.0[2], b.0[2]),
    ])
}

// -- Table images --------------------------------------------------------------

pub fn standings(rows: &[StandingsRow], out_dir: &Path) -> Result<PathBuf, RenderError> {
    if rows.is_empty() {
        return Err(RenderError::EmptyTable);
    }
    let spec = TableSpec {
        headers: &["Position", "Team", "Matches", "Won", "Draw", "Lost", "Points"],
        header_bg: WHITE,
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.position.to_string(),
                    row.team.clone(),
                    row.played.to_string(),
                    row.won.to_string(),
                    row.drawn.to_string(),
                    row.lost.to_string(),
                    row.points.to_string(),
                ]
            })
            .collect(),
        row_colors: standings_row_colors(rows),
    };
    save(draw_table(&spec), out_dir, STANDINGS_FILE)
}

pub fn squad(rows: &[SquadRow], out_dir: &Path) -> Result<PathBuf, RenderError> {
    if rows.is_empty() {
        return Err(RenderError::EmptyTable);
    }
    let spec = TableSpec {
        headers: &["number", "position", "name", "age"],
        header_bg: HEADER_GREY,
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.number.map(|n| n.to_string()).unwrap_or_default(),
                    row.position.clone(),
                    row.name.clone(),
                    row.age.map(|a| a.to_string()).unwrap_or_default(),
                ]
            })
            .collect(),
        row_colors: rows
            .iter()
            .map(|row| position_color(&row.position))
            .collect(),
    };
    save(draw_table(&spec), out_dir, SQUAD_FILE)
}

pub fn form(rows: &[FormRow], out_dir: &Path) -> Result<PathBuf, RenderError> {
    if rows.is_empty() {
        return Err(RenderError::EmptyTable);
    }
    let spec = TableSpec {
        headers: &["result", "opponent_team", "W/D/L"],
        header_bg: HEADER_GREY,
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.scoreline.clone(),
                    row.opponent.clone(),
                    row.outcome.letter().to_string(),
                ]
            })
            .collect(),
        row_colors: rows.iter().map(|row| outcome_color(row.outcome)).collect(),
    };
    save(draw_table(&spec), out_dir, FORM_FILE)
}

// -- Live matches text -----------------------------------------------------------

/// One line per live fixture, in input order. An unknown clock renders as
/// "?" rather than dropping the match.
pub fn matches_text(rows: &[LiveMatchRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let elapsed = match row.elapsed {
            Some(minutes) => minutes.to_string(),
            None => "?".to_string(),
        };
        out.push_str(&format!(
            "{} - {} {} ({} - {}m)\n",
            row.fixture_id, row.label, row.score, row.status, elapsed
        ));
    }
    out
}

// -- Prediction rose ---------------------------------------------------------------

/// Polar chart of the comparison metrics: one spoke per metric, one filled
/// closed trace per side. Returns the image path together with the legend
/// line naming each side's color, delivered as a separate message.
pub fn prediction_rose(
    table: &PredictionTable,
    out_dir: &Path,
) -> Result<(PathBuf, String), RenderError> {
    if table.metrics.is_empty() {
        return Err(RenderError::EmptyTable);
    }

    let mut img = RgbImage::from_pixel(ROSE_SIZE, ROSE_SIZE, WHITE);
    let cx = ROSE_SIZE as f32 / 2.0;
    let cy = ROSE_SIZE as f32 / 2.0;
    let n = table.metrics.len();

    // Radial scale tolerates metrics above 100%.
    let peak = table
        .metrics
        .iter()
        .flat_map(|m| [m.home, m.away])
        .fold(1.0_f64, f64::max) as f32;

    for step in 1..=4 {
        draw_ring(&mut img, cx, cy, ROSE_RADIUS * step as f32 / 4.0, RING);
    }
    for (i, metric) in table.metrics.iter().enumerate() {
        let angle = spoke_angle(i, n);
        let rim = polar(cx, cy, ROSE_RADIUS, angle);
        draw_line(&mut img, (cx, cy), rim, RING);

        let label_anchor = polar(cx, cy, ROSE_RADIUS + 18.0, angle);
        let label_x = label_anchor.0 - text_width(&metric.name) as f32 / 2.0;
        let label_y = label_anchor.1 - (GLYPH_H * TEXT_SCALE) as f32 / 2.0;
        draw_text(&mut img, label_x as i64, label_y as i64, &metric.name, TEXT);
    }

    let home_points = trace_points(table, cx, cy, peak, |m| m.home);
    let away_points = trace_points(table, cx, cy, peak, |m| m.away);
    fill_polygon(&mut img, &home_points, HOME_TRACE, TRACE_FILL_ALPHA);
    fill_polygon(&mut img, &away_points, AWAY_TRACE, TRACE_FILL_ALPHA);
    draw_closed_trace(&mut img, &home_points, HOME_TRACE);
    draw_closed_trace(&mut img, &away_points, AWAY_TRACE);

    let path = save(img, out_dir, PREDICTION_FILE)?;
    let legend = format!("{} - blue\n{} - orange", table.home_team, table.away_team);
    Ok((path, legend))
}

fn trace_points(
    table: &PredictionTable,
    cx: f32,
    cy: f32,
    peak: f32,
    side: impl Fn(&ComparisonMetric) -> f64,
) -> Vec<(f32, f32)> {
    let n = table.metrics.len();
    table
        .metrics
        .iter()
        .enumerate()
        .map(|(i, metric)| {
            let r = ROSE_RADIUS * side(metric) as f32 / peak;
            polar(cx, cy, r, spoke_angle(i, n))
        })
        .collect()
}

/// First spoke points up; the rest proceed clockwise on screen.
fn spoke_angle(index: usize, count: usize) -> f32 {
    -TAU / 4.0 + TAU * index as f32 / count as f32
}

fn polar(cx: f32, cy: f32, radius: f32, angle: f32) -> (f32, f32) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

fn draw_closed_trace(img: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>) {
    if points.is_empty() {
        return;
    }
    for i in 0..points.len() {
        let next = points[(i + 1) % points.len()];
        draw_line(img, points[i], next, color);
    }
}

fn draw_ring(img: &mut RgbImage, cx: f32, cy: f32, radius: f32, color: Rgb<u8>) {
    const STEPS: u32 = 72;
    let mut prev = polar(cx, cy, radius, 0.0);
    for step in 1..=STEPS {
        let next = polar(cx, cy, radius, TAU * step as f32 / STEPS as f32);
        draw_line(img, prev, next, color);
        prev = next;
    }
}

// -- Grid table drawing ----------------------------------------------------------

struct TableSpec<'a> {
    headers: &'a [&'a str],
    header_bg: Rgb<u8>,
    rows: Vec<Vec<String>>,
    row_colors: Vec<Rgb<u8>>,
}

fn draw_table(spec: &TableSpec) -> RgbImage {
    let mut widths: Vec<u32> = spec
        .headers
        .iter()
        .map(|header| text_width(header))
        .collect();
    for row in &spec.rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(text_width(cell));
        }
    }
    let widths: Vec<u32> = widths.into_iter().map(|w| w + 2 * CELL_PAD_X).collect();
    let total_w: u32 = widths.iter().sum::<u32>() + 1;
    let total_h = (spec.rows.len() as u32 + 1) * ROW_HEIGHT + 1;

    let mut img = RgbImage::from_pixel(total_w, total_h, WHITE);

    fill_rect(&mut img, 0, 0, total_w, ROW_HEIGHT, spec.header_bg);
    for (i, color) in spec.row_colors.iter().enumerate() {
        fill_rect(
            &mut img,
            0,
            (i as u32 + 1) * ROW_HEIGHT,
            total_w,
            ROW_HEIGHT,
            *color,
        );
    }

    // Grid lines.
    for band in 0..=(spec.rows.len() as u32 + 1) {
        fill_rect(&mut img, 0, (band * ROW_HEIGHT).min(total_h - 1), total_w, 1, GRID);
    }
    let mut x = 0;
    for width in &widths {
        fill_rect(&mut img, x, 0, 1, total_h, GRID);
        x += width;
    }
    fill_rect(&mut img, total_w - 1, 0, 1, total_h, GRID);

    // Cell text, centered both ways.
    let text_y_offset = (ROW_HEIGHT - GLYPH_H * TEXT_SCALE) / 2;
    let mut x = 0;
    for (i, header) in spec.headers.iter().enumerate() {
        let tx = x + (widths[i] - text_width(header)) / 2;
        draw_text(&mut img, tx as i64, text_y_offset as i64, header, TEXT);
        x += widths[i];
    }
    for (row_idx, row) in spec.rows.iter().enumerate() {
        let y = (row_idx as u32 + 1) * ROW_HEIGHT + text_y_offset;
        let mut x = 0;
        for (i, cell) in row.iter().enumerate() {
            let tx = x + (widths[i] - text_width(cell)) / 2;
            draw_text(&mut img, tx as i64, y as i64, cell, TEXT);
            x += widths[i];
        }
    }

    img
}

// -- Pixel primitives --------------------------------------------------------------

fn text_width(text: &str) -> u32 {
    text.chars().count() as u32 * GLYPH_W * TEXT_SCALE
}

fn draw_text(img: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch) {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_W {
                    if (*bits >> col) & 1 == 1 {
                        for sy in 0..TEXT_SCALE {
                            for sx in 0..TEXT_SCALE {
                                put(
                                    img,
                                    pen_x + (col * TEXT_SCALE + sx) as i64,
                                    y + (row as u32 * TEXT_SCALE + sy) as i64,
                                    color,
                                );
                            }
                        }
                    }
                }
            }
        }
        pen_x += (GLYPH_W * TEXT_SCALE) as i64;
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    img.put_pixel(x as u32, y as u32, color);
}

fn blend(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, alpha: f32) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        px.0[c] = (px.0[c] as f32 * (1.0 - alpha) + color.0[c] as f32 * alpha).round() as u8;
    }
}

fn draw_line(img: &mut RgbImage, from: (f32, f32), to: (f32, f32), color: Rgb<u8>) {
    let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Even-odd scanline fill, alpha-blended so overlapping traces stay legible.
fn fill_polygon(img: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>, alpha: f32) {
    if points.len() < 3 {
        return;
    }
    let min_y = points
        .iter()
        .map(|p| p.1)
        .fold(f32::MAX, f32::min)
        .floor()
        .max(0.0) as i64;
    let max_y = points
        .iter()
        .map(|p| p.1)
        .fold(f32::MIN, f32::max)
        .ceil()
        .min(img.height() as f32 - 1.0) as i64;

    for y in min_y..=max_y {
        let scan = y as f32 + 0.5;
        let mut crossings = Vec::new();
        for i in 0..points.len() {
            let (x1, y1) = points[i];
            let (x2, y2) = points[(i + 1) % points.len()];
            if (y1 <= scan && y2 > scan) || (y2 <= scan && y1 > scan) {
                let t = (scan - y1) / (y2 - y1);
                crossings.push(x1 + t * (x2 - x1));
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for pair in crossings.chunks(2) {
            let [start, end] = pair else { continue };
            for x in start.round() as i64..=end.round() as i64 {
                blend(img, x, y, color, alpha);
            }
        }
    }
}

fn save(img: RgbImage, out_dir: &Path, file: &str) -> Result<PathBuf, RenderError> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file);
    img.save(&path)
        .map_err(|err| RenderError::Encode(err.to_string()))?;
    Ok(path)
}
