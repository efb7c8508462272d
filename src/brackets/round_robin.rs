//! Builds the full schedule for a round-robin pool.
//!
//! Every unordered pair of participants meets exactly once. Rounds are laid
//! out with the circle method so that nobody plays twice in the same
//! `round_number` (odd pools sit one participant out per round); this is a
//! scheduling convenience only, round robin has no progression dependency
//! between matches.

use uuid::Uuid;

use crate::{error::BracketError, validation::check_dense_seeds};

use super::{BracketMatch, Participant};

/// Creates all m*(m-1)/2 matches for one pool, eagerly, with both athletes
/// known. Matches are tagged `round_type = "round"`; elimination labels do
/// not apply to pools.
pub fn schedule(
    bracket_id: &str,
    participants: &[Participant],
) -> Result<Vec<BracketMatch>, BracketError> {
    if participants.is_empty() {
        return Err(BracketError::EmptyBracket);
    }

    let seeds: Vec<i64> = participants.iter().map(|p| p.seed).collect();
    check_dense_seeds(&seeds)?;

    // Circle method: fix ring[0], rotate the rest one step per round. The
    // dummy entry gives its opponent the round off in odd-sized pools.
    let mut ring: Vec<Option<&str>> = participants
        .iter()
        .map(|p| Some(p.athlete_id.as_str()))
        .collect();
    if ring.len() % 2 != 0 {
        ring.push(None);
    }
    let m = ring.len();

    let mut out = Vec::with_capacity(participants.len() * (participants.len() - 1) / 2);
    for round in 0..m.saturating_sub(1) {
        let mut position = 0i64;
        for i in 0..m / 2 {
            if let (Some(a1), Some(a2)) = (ring[i], ring[m - 1 - i]) {
                out.push(BracketMatch {
                    id: Uuid::now_v7().to_string(),
                    bracket_id: bracket_id.to_string(),
                    round_number: (round + 1) as i64,
                    position,
                    round_type: "round".to_string(),
                    repechage_step: None,
                    athlete1: Some(a1.to_string()),
                    athlete2: Some(a2.to_string()),
                    winner: None,
                    score_athlete1: None,
                    score_athlete2: None,
                    is_finished: false,
                    status: "P".to_string(),
                });
                position += 1;
            }
        }
        // rotate all but ring[0] one step clockwise
        ring[1..].rotate_right(1);
    }

    Ok(out)
}

/// Partitions a category roster into pools of at most `pool_size`,
/// serpentine by seed so pool strengths stay balanced. The caller creates
/// one bracket per pool, distinguished by `group_id`.
pub fn plan_pools(
    participants: &[Participant],
    pool_size: usize,
) -> Result<Vec<Vec<Participant>>, BracketError> {
    if pool_size < 2 {
        return Err(BracketError::Internal(format!(
            "a pool needs at least two participants, got pool size \
             {pool_size}"
        )));
    }

    if participants.is_empty() {
        return Ok(Vec::new());
    }

    let pool_count = participants.len().div_ceil(pool_size);
    let mut pools: Vec<Vec<Participant>> = vec![Vec::new(); pool_count];

    let mut ordered: Vec<&Participant> = participants.iter().collect();
    ordered.sort_by_key(|p| p.seed);

    for (lap, chunk) in ordered.chunks(pool_count).enumerate() {
        for (i, p) in chunk.iter().enumerate() {
            let pool = if lap % 2 == 0 { i } else { chunk.len() - 1 - i };
            pools[pool].push((*p).clone());
        }
    }

    Ok(pools)
}
