//! The match progression engine.
//!
//! `submit_result` records a score, determines the winner, and propagates
//! it: into the next main-draw round, and (for repechage-feed rounds) the
//! loser into the consolation ladder. Bye auto-resolution is an iterative
//! work-list over the bracket's match set, so a win cascading through an
//! all-bye arm costs O(log N) updates and no recursion. The same work-list
//! resolves the byes the builders leave in a freshly generated skeleton.
//!
//! Every call executes as one transaction against the bracket's match set.
//! Callers serialize calls touching the same bracket through
//! [`crate::state::BracketLocks`].

use std::collections::HashMap;

use diesel::{
    Connection, connection::LoadConnection, prelude::*, sqlite::Sqlite,
};

use crate::{
    error::BracketError,
    msg::{Msg, MsgContents, MsgSender},
    schema::{bracket_matches, brackets},
    validation::check_score,
};

use super::{
    Bracket, BracketMatch, KIND_SINGLE_ELIMINATION, repechage::LadderShape,
};

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
enum MatchKey {
    Main { round: i64, position: i64 },
    Rep { step: i64, position: i64 },
}

#[derive(Clone, Copy, Debug)]
enum Slot {
    Athlete1,
    Athlete2,
}

/// Which athlete of a finished match flows onward.
#[derive(Clone, Copy, Debug)]
enum Take {
    Winner,
    Loser,
}

/// The in-memory working copy of one bracket's matches, indexed by their
/// structural position. All mutation happens here; changed rows are written
/// back in one batch by [`MatchSet::flush`].
pub(super) struct MatchSet {
    matches: Vec<BracketMatch>,
    by_key: HashMap<MatchKey, usize>,
    by_id: HashMap<String, usize>,
    dirty: Vec<bool>,
    total_rounds: i64,
    elimination: bool,
    ladder: Option<LadderShape>,
}

impl MatchSet {
    pub(super) fn load(
        bracket: &Bracket,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, BracketError> {
        let matches = bracket.matches(conn)?;

        let total_rounds = matches
            .iter()
            .filter(|m| !m.is_repechage())
            .map(|m| m.round_number)
            .max()
            .unwrap_or(0);

        let elimination = bracket.kind == KIND_SINGLE_ELIMINATION;
        let ladder = if elimination
            && bracket.repechage
            && matches.iter().any(BracketMatch::is_repechage)
        {
            LadderShape::of(total_rounds)
        } else {
            None
        };

        let mut by_key = HashMap::with_capacity(matches.len());
        let mut by_id = HashMap::with_capacity(matches.len());
        for (i, m) in matches.iter().enumerate() {
            by_key.insert(key_of(m), i);
            by_id.insert(m.id.clone(), i);
        }

        let dirty = vec![false; matches.len()];
        Ok(MatchSet {
            matches,
            by_key,
            by_id,
            dirty,
            total_rounds,
            elimination,
            ladder,
        })
    }

    pub(super) fn index_of_id(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub(super) fn match_at(&self, idx: usize) -> &BracketMatch {
        &self.matches[idx]
    }

    pub(super) fn all_finished(&self) -> bool {
        self.matches.iter().all(|m| m.is_finished)
    }

    /// Records a submitted result on an open match. The caller has already
    /// validated the scores and checked both athletes are present.
    pub(super) fn record_result(
        &mut self,
        idx: usize,
        score_athlete1: i64,
        score_athlete2: i64,
    ) {
        let m = &mut self.matches[idx];
        let winner = if score_athlete1 > score_athlete2 {
            m.athlete1.clone()
        } else {
            m.athlete2.clone()
        };
        m.score_athlete1 = Some(score_athlete1);
        m.score_athlete2 = Some(score_athlete2);
        m.winner = winner;
        m.is_finished = true;
        m.status = "F".to_string();
        self.dirty[idx] = true;
    }

    /// The matches which must all be finished before the given match can
    /// auto-resolve (and which supply its athletes).
    fn feeders(&self, key: MatchKey) -> Vec<MatchKey> {
        if !self.elimination {
            return Vec::new();
        }
        match key {
            MatchKey::Main { round: 1, .. } => Vec::new(),
            MatchKey::Main { round, position } => vec![
                MatchKey::Main {
                    round: round - 1,
                    position: 2 * position,
                },
                MatchKey::Main {
                    round: round - 1,
                    position: 2 * position + 1,
                },
            ],
            MatchKey::Rep { step, position } => {
                let Some(shape) = self.ladder else {
                    return Vec::new();
                };
                match step {
                    1 => {
                        let feed = shape.feed_round(1);
                        vec![
                            MatchKey::Main {
                                round: feed,
                                position: 2 * position,
                            },
                            MatchKey::Main {
                                round: feed,
                                position: 2 * position + 1,
                            },
                        ]
                    }
                    2 => vec![
                        MatchKey::Rep { step: 1, position },
                        MatchKey::Main {
                            round: shape.semifinal_round,
                            position,
                        },
                    ],
                    _ => vec![
                        MatchKey::Rep {
                            step: 2,
                            position: 0,
                        },
                        MatchKey::Rep {
                            step: 2,
                            position: 1,
                        },
                    ],
                }
            }
        }
    }

    /// Where the athletes of a finished match flow: at most one main-draw
    /// target for the winner, at most one ladder target for the loser.
    fn targets(&self, key: MatchKey) -> Vec<(MatchKey, Slot, Take)> {
        if !self.elimination {
            return Vec::new();
        }

        let mut out = Vec::new();
        match key {
            MatchKey::Main { round, position } => {
                if round < self.total_rounds {
                    out.push((
                        MatchKey::Main {
                            round: round + 1,
                            position: position / 2,
                        },
                        slot_of_parity(position),
                        Take::Winner,
                    ));
                }
                if let Some(shape) = self.ladder {
                    if shape.quarterfinal_round == Some(round) {
                        out.push((
                            MatchKey::Rep {
                                step: 1,
                                position: position / 2,
                            },
                            slot_of_parity(position),
                            Take::Loser,
                        ));
                    } else if shape.semifinal_round == round {
                        if shape.steps == 3 {
                            // step-2 matches hold the step-1 winner in
                            // athlete1 and the semifinal loser in athlete2
                            out.push((
                                MatchKey::Rep { step: 2, position },
                                Slot::Athlete2,
                                Take::Loser,
                            ));
                        } else {
                            out.push((
                                MatchKey::Rep {
                                    step: 1,
                                    position: 0,
                                },
                                slot_of_parity(position),
                                Take::Loser,
                            ));
                        }
                    }
                }
            }
            MatchKey::Rep { step, position } => {
                if let Some(shape) = self.ladder
                    && step < shape.steps
                {
                    let target = if step == 1 {
                        (
                            MatchKey::Rep { step: 2, position },
                            Slot::Athlete1,
                            Take::Winner,
                        )
                    } else {
                        (
                            MatchKey::Rep {
                                step: 3,
                                position: 0,
                            },
                            slot_of_parity(position),
                            Take::Winner,
                        )
                    };
                    out.push(target);
                }
            }
        }
        out
    }

    /// Writes an athlete into the next open slot. An occupied slot means
    /// the tree was built incorrectly; that is surfaced, never swallowed.
    fn fill_slot(
        &mut self,
        idx: usize,
        slot: Slot,
        athlete: String,
    ) -> Result<(), BracketError> {
        let m = &mut self.matches[idx];
        let target = match slot {
            Slot::Athlete1 => &mut m.athlete1,
            Slot::Athlete2 => &mut m.athlete2,
        };
        match target {
            Some(existing) if *existing != athlete => {
                return Err(BracketError::Internal(format!(
                    "slot {slot:?} of match {} already holds {existing}",
                    m.id
                )));
            }
            _ => *target = Some(athlete),
        }
        self.dirty[idx] = true;
        Ok(())
    }

    /// Finishes a match which can never be played: all feeders are done
    /// and fewer than two athletes arrived. Returns whether the match was
    /// newly finished.
    fn try_resolve_bye(&mut self, idx: usize) -> bool {
        if self.matches[idx].is_finished {
            return false;
        }

        let key = key_of(&self.matches[idx]);
        let all_fed = self.feeders(key).iter().all(|feeder| {
            self.by_key
                .get(feeder)
                .is_some_and(|&i| self.matches[i].is_finished)
        });
        if !all_fed {
            return false;
        }

        let m = &mut self.matches[idx];
        match (&m.athlete1, &m.athlete2) {
            (Some(_), Some(_)) => false,
            (one, other) => {
                m.winner = one.clone().or_else(|| other.clone());
                m.is_finished = true;
                m.status = "B".to_string();
                self.dirty[idx] = true;
                true
            }
        }
    }

    /// Work-list propagation from a finished match: push athletes into
    /// their target slots, auto-resolve any target that became a bye, and
    /// keep going until the cascade dies out.
    pub(super) fn propagate_from(
        &mut self,
        start: usize,
    ) -> Result<(), BracketError> {
        let mut work = vec![start];
        while let Some(i) = work.pop() {
            let key = key_of(&self.matches[i]);
            for (target_key, slot, take) in self.targets(key) {
                let target =
                    self.by_key.get(&target_key).copied().ok_or_else(
                        || {
                            BracketError::Internal(format!(
                                "no match at {target_key:?}, fed by {key:?}"
                            ))
                        },
                    )?;

                let athlete = match take {
                    Take::Winner => self.matches[i].winner.clone(),
                    Take::Loser => {
                        self.matches[i].loser().map(str::to_string)
                    }
                };
                // a bye produces no loser; the target may still resolve
                if let Some(athlete) = athlete {
                    self.fill_slot(target, slot, athlete)?;
                }

                if self.try_resolve_bye(target) {
                    work.push(target);
                }
            }
        }
        Ok(())
    }

    /// Resolves every bye in a freshly built skeleton. Called once by the
    /// regeneration coordinator.
    pub(super) fn cascade_all(&mut self) -> Result<(), BracketError> {
        for i in 0..self.matches.len() {
            if self.try_resolve_bye(i) {
                self.propagate_from(i)?;
            }
        }
        Ok(())
    }

    /// Writes changed rows back.
    pub(super) fn flush(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), BracketError> {
        for (i, m) in self.matches.iter().enumerate() {
            if !self.dirty[i] {
                continue;
            }
            diesel::update(
                bracket_matches::table.filter(bracket_matches::id.eq(&m.id)),
            )
            .set((
                bracket_matches::athlete1.eq(&m.athlete1),
                bracket_matches::athlete2.eq(&m.athlete2),
                bracket_matches::winner.eq(&m.winner),
                bracket_matches::score_athlete1.eq(m.score_athlete1),
                bracket_matches::score_athlete2.eq(m.score_athlete2),
                bracket_matches::is_finished.eq(m.is_finished),
                bracket_matches::status.eq(&m.status),
            ))
            .execute(conn)?;
        }
        Ok(())
    }
}

fn key_of(m: &BracketMatch) -> MatchKey {
    match m.repechage_step {
        Some(step) => MatchKey::Rep {
            step,
            position: m.position,
        },
        None => MatchKey::Main {
            round: m.round_number,
            position: m.position,
        },
    }
}

/// The winner of position p lands in position p/2 of the next round:
/// athlete1 when p is even, athlete2 when p is odd. Deterministic slotting
/// keeps concurrent submissions for sibling matches commutative.
fn slot_of_parity(position: i64) -> Slot {
    if position % 2 == 0 {
        Slot::Athlete1
    } else {
        Slot::Athlete2
    }
}

/// Records a result for a match and advances the bracket.
///
/// Rejected before any mutation: unknown match, already-finished match, a
/// match still missing an athlete, negative scores, and ties (tie-breaks
/// must be resolved on the mat; the engine does not invent them). On
/// success a `MatchUpdate` is broadcast synchronously, and
/// `BracketFinished` once the last match is done.
pub fn submit_result(
    match_id: &str,
    score_athlete1: i64,
    score_athlete2: i64,
    msgs: &MsgSender,
    conn: &mut (impl Connection<Backend = Sqlite> + LoadConnection),
) -> Result<BracketMatch, BracketError> {
    let span = tracing::span!(
        tracing::Level::INFO,
        "submit_result",
        match_id = match_id
    );
    let _guard = span.enter();

    check_score(score_athlete1)?;
    check_score(score_athlete2)?;
    if score_athlete1 == score_athlete2 {
        return Err(BracketError::InvalidScore(format!(
            "tied at {score_athlete1}-{score_athlete2}; ties must be \
             disambiguated before submission"
        )));
    }

    let (updated, bracket_id, finished) =
        conn.transaction(|conn| -> Result<_, BracketError> {
            let m = BracketMatch::fetch(match_id, conn)?;
            if m.is_finished {
                return Err(BracketError::MatchAlreadyFinished);
            }
            if m.athlete1.is_none() || m.athlete2.is_none() {
                return Err(BracketError::IncompleteMatchup);
            }

            let bracket = Bracket::fetch(&m.bracket_id, conn)?;
            let mut set = MatchSet::load(&bracket, conn)?;
            let idx = set.index_of_id(&m.id).ok_or_else(|| {
                BracketError::Internal(format!(
                    "match {} not in its bracket's match set",
                    m.id
                ))
            })?;

            set.record_result(idx, score_athlete1, score_athlete2);
            set.propagate_from(idx)?;
            set.flush(conn)?;

            let finished = set.all_finished();
            let new_status = if finished {
                Some("F")
            } else if bracket.status == "P" {
                Some("S")
            } else {
                None
            };
            if let Some(status) = new_status {
                diesel::update(
                    brackets::table.filter(brackets::id.eq(&bracket.id)),
                )
                .set(brackets::status.eq(status))
                .execute(conn)?;
            }

            Ok((set.match_at(idx).clone(), bracket.id, finished))
        })?;

    tracing::debug!(winner = ?updated.winner, "result recorded");

    let _ = msgs.send(Msg {
        bracket_id: bracket_id.clone(),
        inner: MsgContents::MatchUpdate {
            match_id: updated.id.clone(),
            score_athlete1,
            score_athlete2,
            status: updated.status.clone(),
        },
    });
    if finished {
        let _ = msgs.send(Msg {
            bracket_id,
            inner: MsgContents::BracketFinished,
        });
    }

    Ok(updated)
}
