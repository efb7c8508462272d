//! Builds the repechage (consolation) ladder for elimination brackets.
//!
//! Losers of the quarterfinal and semifinal rounds re-enter the ladder:
//! step 1 pairs the quarterfinal losers, step 2 pairs the step-1 winners
//! with the semifinal losers, and step 3 is the bronze-medal match. A draw
//! with no quarterfinal round degenerates to a single step, the semifinal
//! losers' bronze match. Ladder matches carry `repechage_step`; their
//! `round_number` is the main-draw round feeding the step (the last feed
//! round for the winners-only bronze step), kept for loser provenance.
//!
//! Like the main draw, the ladder is created as an unplayed skeleton; slots
//! that can never fill (the feeder was a bye) are resolved by the shared
//! progression work-list.

use uuid::Uuid;

use super::BracketMatch;

/// Structural description of the ladder for a draw of `total_rounds`
/// rounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LadderShape {
    /// Main-draw round whose losers enter at step 1, when the draw is deep
    /// enough to have quarterfinals.
    pub quarterfinal_round: Option<i64>,
    /// Main-draw round whose losers enter at the penultimate (or only)
    /// step.
    pub semifinal_round: i64,
    pub steps: i64,
}

impl LadderShape {
    /// `None` when the draw is too shallow for a ladder (a one-round draw
    /// has a single loser and nothing to decide).
    pub fn of(total_rounds: i64) -> Option<LadderShape> {
        match total_rounds {
            ..=1 => None,
            2 => Some(LadderShape {
                quarterfinal_round: None,
                semifinal_round: 1,
                steps: 1,
            }),
            k => Some(LadderShape {
                quarterfinal_round: Some(k - 2),
                semifinal_round: k - 1,
                steps: 3,
            }),
        }
    }

    /// Matches at a given step: 2 at the feed steps of the full ladder, 1
    /// at the bronze step.
    pub fn matches_at_step(&self, step: i64) -> i64 {
        if step == self.steps { 1 } else { 2 }
    }

    /// `round_number` recorded on matches of a step.
    pub fn feed_round(&self, step: i64) -> i64 {
        match (self.quarterfinal_round, step) {
            (Some(qf), 1) => qf,
            _ => self.semifinal_round,
        }
    }
}

/// Creates the unplayed ladder skeleton.
pub fn skeleton(bracket_id: &str, shape: LadderShape) -> Vec<BracketMatch> {
    let mut out = Vec::new();
    for step in 1..=shape.steps {
        for position in 0..shape.matches_at_step(step) {
            out.push(BracketMatch {
                id: Uuid::now_v7().to_string(),
                bracket_id: bracket_id.to_string(),
                round_number: shape.feed_round(step),
                position,
                round_type: "round".to_string(),
                repechage_step: Some(step),
                athlete1: None,
                athlete2: None,
                winner: None,
                score_athlete1: None,
                score_athlete2: None,
                is_finished: false,
                status: "P".to_string(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_ladder_below_two_rounds() {
        assert_eq!(LadderShape::of(0), None);
        assert_eq!(LadderShape::of(1), None);
    }

    #[test]
    fn two_round_draw_gets_a_lone_bronze_match() {
        let shape = LadderShape::of(2).unwrap();
        assert_eq!(shape.steps, 1);
        let matches = skeleton("b", shape);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].repechage_step, Some(1));
        assert_eq!(matches[0].round_number, 1);
    }

    #[test]
    fn full_ladder_is_two_two_one() {
        let shape = LadderShape::of(3).unwrap();
        let matches = skeleton("b", shape);
        let at_step = |s| {
            matches
                .iter()
                .filter(|m| m.repechage_step == Some(s))
                .count()
        };
        assert_eq!((at_step(1), at_step(2), at_step(3)), (2, 2, 1));
        // provenance: step 1 from the quarterfinals, steps 2 and 3 from the
        // semifinals
        assert!(matches
            .iter()
            .filter(|m| m.repechage_step == Some(1))
            .all(|m| m.round_number == 1));
        assert!(matches
            .iter()
            .filter(|m| m.repechage_step != Some(1))
            .all(|m| m.round_number == 2));
    }

    #[test]
    fn deep_draws_still_feed_from_the_last_three_rounds() {
        let shape = LadderShape::of(5).unwrap();
        assert_eq!(shape.quarterfinal_round, Some(3));
        assert_eq!(shape.semifinal_round, 4);
        assert_eq!(shape.steps, 3);
    }
}
