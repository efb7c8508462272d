//! Standings for round-robin pools.
//!
//! Ordering: wins, then score differential, then total scored, with seed as
//! the final (stable) key. Head-to-head is deliberately not used: it is not
//! well-defined for three-way ties, and nothing in the recorded data
//! requires it.

use diesel::{connection::LoadConnection, sqlite::Sqlite};
use indexmap::IndexMap;

use crate::error::BracketError;

use super::Bracket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsRow {
    pub athlete_id: String,
    pub seed: i64,
    pub played: i64,
    pub wins: i64,
    pub scored: i64,
    pub conceded: i64,
}

impl StandingsRow {
    pub fn differential(&self) -> i64 {
        self.scored - self.conceded
    }
}

pub struct RoundRobinStandings {
    /// Best first.
    pub rows: Vec<StandingsRow>,
}

impl RoundRobinStandings {
    pub fn compute(
        bracket_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, BracketError> {
        let bracket = Bracket::fetch(bracket_id, conn)?;

        // participants first, so athletes with no finished match still rank
        let mut rows: IndexMap<String, StandingsRow> = bracket
            .participants(conn)?
            .into_iter()
            .map(|p| {
                (
                    p.athlete_id.clone(),
                    StandingsRow {
                        athlete_id: p.athlete_id,
                        seed: p.seed,
                        played: 0,
                        wins: 0,
                        scored: 0,
                        conceded: 0,
                    },
                )
            })
            .collect();

        for m in bracket.matches(conn)? {
            if !m.is_finished || m.status != "F" {
                continue;
            }
            let (Some(a1), Some(a2)) = (&m.athlete1, &m.athlete2) else {
                continue;
            };
            let s1 = m.score_athlete1.unwrap_or(0);
            let s2 = m.score_athlete2.unwrap_or(0);

            if let Some(row) = rows.get_mut(a1.as_str()) {
                row.played += 1;
                row.scored += s1;
                row.conceded += s2;
                if m.winner.as_deref() == Some(a1) {
                    row.wins += 1;
                }
            }
            if let Some(row) = rows.get_mut(a2.as_str()) {
                row.played += 1;
                row.scored += s2;
                row.conceded += s1;
                if m.winner.as_deref() == Some(a2) {
                    row.wins += 1;
                }
            }
        }

        let mut rows: Vec<StandingsRow> = rows.into_values().collect();
        rows.sort_by_key(|r| {
            (-r.wins, -r.differential(), -r.scored, r.seed)
        });

        Ok(RoundRobinStandings { rows })
    }
}
