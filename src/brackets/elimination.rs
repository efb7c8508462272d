//! Builds the single-elimination match graph.
//!
//! The builder only emits the skeleton: round 1 is populated from the
//! seeded slot array, later rounds are created with empty athlete slots.
//! Bye auto-resolution (including cascades through all-bye arms) is the
//! progression work-list's job, shared with result entry.

use uuid::Uuid;

use super::{BracketMatch, round_type};

/// Number of main-draw rounds for a slot array of the given (power of two)
/// length.
pub fn total_rounds(slot_count: usize) -> i64 {
    debug_assert!(slot_count.is_power_of_two() && slot_count >= 2);
    i64::from(slot_count.ilog2())
}

/// Creates the unplayed match skeleton for a seeded slot array of length
/// 2^k: k rounds, round r holding 2^(k-r) matches. Match `p` of round `r`
/// is fed by matches `2p` and `2p+1` of round `r-1`.
pub fn skeleton(
    bracket_id: &str,
    slots: &[Option<String>],
) -> Vec<BracketMatch> {
    let size = slots.len();
    let rounds = total_rounds(size);

    let mut out = Vec::with_capacity(size - 1);
    for round in 1..=rounds {
        let matches_in_round = size >> round;
        for position in 0..matches_in_round {
            let (athlete1, athlete2) = if round == 1 {
                (slots[2 * position].clone(), slots[2 * position + 1].clone())
            } else {
                (None, None)
            };

            out.push(BracketMatch {
                id: Uuid::now_v7().to_string(),
                bracket_id: bracket_id.to_string(),
                round_number: round,
                position: position as i64,
                round_type: round_type(round, rounds).to_string(),
                repechage_step: None,
                athlete1,
                athlete2,
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
