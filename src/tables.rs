//! Normalized tables produced by the fetch layer and consumed by the
//! renderer. Every row is a pure function of one API response; nothing in
//! here touches the network.

use std::fmt;

/// One line of a league table, kept in the order the API ranks them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsRow {
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub points: i32,
}

/// Match outcome from the queried team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Derive the outcome from an `own:opponent` scoreline. The first number
    /// is always the queried team's goals, never the home side's.
    pub fn from_scoreline(scoreline: &str) -> Option<Outcome> {
        let (own, opponent) = scoreline.split_once(':')?;
        let own: u32 = own.trim().parse().ok()?;
        let opponent: u32 = opponent.trim().parse().ok()?;
        Some(match own.cmp(&opponent) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Loss,
        })
    }

    pub fn letter(self) -> &'static str {
        match self {
            Outcome::Win => "W",
            Outcome::Draw => "D",
            Outcome::Loss => "L",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// One recent fixture from the queried team's perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRow {
    pub opponent: String,
    /// Own goals first, opponent goals second, regardless of venue.
    pub scoreline: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadRow {
    pub number: Option<u32>,
    pub position: String,
    pub name: String,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMatchRow {
    pub fixture_id: u64,
    /// "Home vs Away".
    pub label: String,
    /// "home:away" with missing goal counts already defaulted to 0.
    pub score: String,
    /// Short status code, e.g. "1H", "HT", "2H".
    pub status: String,
    pub elapsed: Option<u32>,
}

/// Side-by-side comparison metrics for one fixture, values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTable {
    pub home_team: String,
    pub away_team: String,
    pub metrics: Vec<ComparisonMetric>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMetric {
    pub name: String,
    pub home: f64,
    pub away: f64,
}

#[cfg(test)]
mod tests {
    use super::Outcome;

    #[test]
    fn outcome_compares_first_number_to_second() {
        assert_eq!(Outcome::from_scoreline("2:1"), Some(Outcome::Win));
        assert_eq!(Outcome::from_scoreline("1:1"), Some(Outcome::Draw));
        assert_eq!(Outcome::from_scoreline("0:3"), Some(Outcome::Loss));
    }

    #[test]
    fn outcome_rejects_malformed_scorelines() {
        assert_eq!(Outcome::from_scoreline("2-1"), None);
        assert_eq!(Outcome::from_scoreline(":"), None);
        assert_eq!(Outcome::from_scoreline("a:b"), None);
        assert_eq!(Outcome::from_scoreline(""), None);
    }
}
