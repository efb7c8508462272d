//! Places seeded participants into the initial slots of an elimination
//! draw.
//!
//! Placement follows standard tournament seeding: seeds 1 and 2 start at
//! opposite ends of the draw, and each seed is placed so that the top seeds
//! can only meet in the latest possible round. When N is not a power of
//! two, the slots beyond N are byes, which this scheme pairs against the
//! top seeds (never against each other).

use crate::{error::BracketError, validation::check_dense_seeds};

use super::Participant;

/// The draw size for N participants: the next power of two >= N, with a
/// floor of 2 so a single entrant still gets a (bye) final.
pub fn bracket_size(n: usize) -> usize {
    n.max(2).next_power_of_two()
}

/// The seed occupying each slot of a draw of the given size (a power of
/// two). Built by recursive interleaving: a draw of size 2m places seed s
/// and seed 2m+1-s in adjacent slots of the half-size draw's layout.
fn seeding_order(size: usize) -> Vec<usize> {
    debug_assert!(size.is_power_of_two());

    let mut order = vec![1usize];
    let mut m = 1;
    while m < size {
        m *= 2;
        let mut next = Vec::with_capacity(m);
        for &s in &order {
            next.push(s);
            next.push(m + 1 - s);
        }
        order = next;
    }
    order
}

/// Orders participants into the initial slot array. Entries beyond N are
/// explicit bye slots (`None`). Participants must arrive with dense
/// 1-based seeds.
pub fn seed_slots(
    participants: &[Participant],
) -> Result<Vec<Option<String>>, BracketError> {
    if participants.is_empty() {
        return Err(BracketError::EmptyBracket);
    }

    let seeds: Vec<i64> = participants.iter().map(|p| p.seed).collect();
    check_dense_seeds(&seeds)?;

    let n = participants.len();
    let size = bracket_size(n);

    let mut athlete_of_seed = vec![None; n + 1];
    for p in participants {
        athlete_of_seed[p.seed as usize] = Some(p.athlete_id.clone());
    }

    Ok(seeding_order(size)
        .into_iter()
        .map(|seed| {
            if seed <= n {
                athlete_of_seed[seed].clone()
            } else {
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::participant_fixture;

    #[test]
    fn order_of_eight() {
        assert_eq!(seeding_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    }

    #[test]
    fn order_of_two() {
        assert_eq!(seeding_order(2), vec![1, 2]);
    }

    #[test]
    fn top_seeds_in_opposite_halves() {
        for k in 1..=6 {
            let size = 1 << k;
            let order = seeding_order(size);
            let pos1 = order.iter().position(|&s| s == 1).unwrap();
            let pos2 = order.iter().position(|&s| s == 2).unwrap();
            assert_ne!(pos1 < size / 2, pos2 < size / 2);
        }
    }

    #[test]
    fn five_participants_get_three_byes() {
        let participants: Vec<_> =
            (1..=5).map(|s| participant_fixture("b", s)).collect();
        let slots = seed_slots(&participants).unwrap();

        assert_eq!(slots.len(), 8);
        assert_eq!(slots.iter().filter(|s| s.is_none()).count(), 3);
        // seed 1 opens the draw, the bye for seed 8 sits next to it
        assert_eq!(slots[0].as_deref(), Some("athlete-1"));
        assert!(slots[1].is_none());
    }

    #[test]
    fn single_participant_is_a_lone_slot() {
        let participants = vec![participant_fixture("b", 1)];
        let slots = seed_slots(&participants).unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots[1].is_none());
    }

    #[test]
    fn empty_list_is_a_caller_error() {
        assert!(matches!(
            seed_slots(&[]),
            Err(BracketError::EmptyBracket)
        ));
    }

    #[test]
    fn gappy_seeds_are_rejected() {
        let mut participants: Vec<_> =
            (1..=4).map(|s| participant_fixture("b", s)).collect();
        participants[3].seed = 7;
        assert!(matches!(
            seed_slots(&participants),
            Err(BracketError::NonContiguousSeeds(_))
        ));
    }
}
