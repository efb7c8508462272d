use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{
    error::BracketError,
    schema::{bracket_matches, bracket_participants, brackets},
};

pub mod elimination;
pub mod progression;
pub mod regenerate;
pub mod repechage;
pub mod round_robin;
pub mod seeding;
pub mod standings;

pub const KIND_SINGLE_ELIMINATION: &str = "single_elimination";
pub const KIND_ROUND_ROBIN: &str = "round_robin";

// Bracket statuses: "P" pending, "S" started, "F" finished.
// Match statuses: "P" pending, "F" finished (a result was recorded),
// "B" auto-resolved by bye.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BracketStatus {
    Pending,
    Started,
    Finished,
}

#[derive(Queryable, Clone, Debug)]
pub struct Bracket {
    pub id: String,
    pub category_id: String,
    /// Disambiguates parallel brackets of the same category (e.g. a
    /// category split into round-robin pools).
    pub group_id: i64,
    pub kind: String,
    pub status: String,
    pub repechage: bool,
    pub start_time: Option<NaiveDateTime>,
    pub tatami: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl Bracket {
    pub fn fetch(
        bracket_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, BracketError> {
        brackets::table
            .filter(brackets::id.eq(bracket_id))
            .first::<Bracket>(conn)
            .optional()?
            .ok_or_else(|| {
                BracketError::BracketNotFound(bracket_id.to_string())
            })
    }

    pub fn status(&self) -> BracketStatus {
        match self.status.as_str() {
            "S" => BracketStatus::Started,
            "F" => BracketStatus::Finished,
            _ => BracketStatus::Pending,
        }
    }

    /// The participants of this bracket, in seed order.
    pub fn participants(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Participant>, BracketError> {
        Ok(bracket_participants::table
            .filter(bracket_participants::bracket_id.eq(&self.id))
            .order_by(bracket_participants::seed.asc())
            .load::<Participant>(conn)?)
    }

    /// The full match set: main draw in (round, position) order, then the
    /// repechage ladder in (step, position) order.
    pub fn matches(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<BracketMatch>, BracketError> {
        Ok(bracket_matches::table
            .filter(bracket_matches::bracket_id.eq(&self.id))
            .order_by((
                bracket_matches::repechage_step.asc(),
                bracket_matches::round_number.asc(),
                bracket_matches::position.asc(),
            ))
            .load::<BracketMatch>(conn)?)
    }
}

#[derive(Queryable, Clone, Debug, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub bracket_id: String,
    pub athlete_id: String,
    pub seed: i64,
    pub last_name: String,
    pub first_name: String,
    /// JSON array of coach last names.
    coaches: String,
}

impl Participant {
    pub fn new(
        bracket_id: &str,
        athlete_id: &str,
        seed: i64,
        last_name: &str,
        first_name: &str,
        coaches: &[String],
    ) -> Self {
        Participant {
            id: uuid::Uuid::now_v7().to_string(),
            bracket_id: bracket_id.to_string(),
            athlete_id: athlete_id.to_string(),
            seed,
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            coaches: serde_json::to_string(coaches)
                .unwrap_or_else(|_| "[]".to_string()),
        }
    }

    pub fn coaches(&self) -> Vec<String> {
        serde_json::from_str(&self.coaches).unwrap_or_default()
    }

    /// The raw JSON stored in the `coaches` column.
    pub fn coaches_json(&self) -> &str {
        &self.coaches
    }
}

#[derive(Queryable, Clone, Debug, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: String,
    pub bracket_id: String,
    /// 1-based, increasing toward the final. For repechage matches this is
    /// the main-draw round whose losers feed the step, kept for loser
    /// provenance.
    pub round_number: i64,
    pub position: i64,
    pub round_type: String,
    /// 1-based ladder step for repechage matches, `None` on the main draw.
    pub repechage_step: Option<i64>,
    pub athlete1: Option<String>,
    pub athlete2: Option<String>,
    pub winner: Option<String>,
    pub score_athlete1: Option<i64>,
    pub score_athlete2: Option<i64>,
    pub is_finished: bool,
    pub status: String,
}

impl BracketMatch {
    pub fn fetch(
        match_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, BracketError> {
        bracket_matches::table
            .filter(bracket_matches::id.eq(match_id))
            .first::<BracketMatch>(conn)
            .optional()?
            .ok_or_else(|| BracketError::MatchNotFound(match_id.to_string()))
    }

    pub fn is_repechage(&self) -> bool {
        self.repechage_step.is_some()
    }

    /// The athlete who lost this match, if there was one to lose (a bye has
    /// a winner but no loser).
    pub fn loser(&self) -> Option<&str> {
        let winner = self.winner.as_deref()?;
        match (self.athlete1.as_deref(), self.athlete2.as_deref()) {
            (Some(a1), Some(a2)) if a1 == winner => Some(a2),
            (Some(a1), Some(_)) => Some(a1),
            _ => None,
        }
    }
}

/// Display label for a main-draw round. Never consulted by progression
/// logic.
pub fn round_type(round_number: i64, total_rounds: i64) -> &'static str {
    match total_rounds - round_number {
        0 => "final",
        1 => "semifinal",
        2 => "quarterfinal",
        _ => "round",
    }
}

#[cfg(test)]
mod tests {
    use super::round_type;

    #[test]
    fn round_labels() {
        assert_eq!(round_type(3, 3), "final");
        assert_eq!(round_type(2, 3), "semifinal");
        assert_eq!(round_type(1, 3), "quarterfinal");
        assert_eq!(round_type(1, 4), "round");
        assert_eq!(round_type(1, 1), "final");
    }
}
