//! Shared fixtures for the engine tests. Everything runs against in-memory
//! SQLite databases with the migrations applied, except where a test needs
//! genuinely concurrent connections.

use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use uuid::Uuid;

use crate::{
    MIGRATIONS,
    brackets::Participant,
    schema::{bracket_participants, brackets},
    state::DbPool,
};


pub fn participant_fixture(bracket_id: &str, seed: i64) -> Participant {
    Participant::new(
        bracket_id,
        &format!("athlete-{seed}"),
        seed,
        &format!("Lastname{seed}"),
        &format!("Firstname{seed}"),
        &["Coach".to_string()],
    )
}

pub fn setup_pool() -> DbPool {
    let pool = diesel::r2d2::Pool::builder()
        .max_size(1)
        .build(diesel::r2d2::ConnectionManager::<SqliteConnection>::new(
            ":memory:",
        ))
        .unwrap();

    let mut conn = pool.get().unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();

    pool
}

/// Inserts a bracket with `n` participants seeded 1..=n. Athlete ids are
/// `athlete-{seed}`.
pub fn insert_bracket(
    conn: &mut SqliteConnection,
    kind: &str,
    repechage: bool,
    n: i64,
) -> String {
    let bracket_id = Uuid::now_v7().to_string();

    diesel::insert_into(brackets::table)
        .values((
            brackets::id.eq(&bracket_id),
            brackets::category_id.eq("seniors-73kg"),
            brackets::group_id.eq(0i64),
            brackets::kind.eq(kind),
            brackets::status.eq("P"),
            brackets::repechage.eq(repechage),
            brackets::tatami.eq(Some(1i64)),
            brackets::created_at.eq(diesel::dsl::now),
        ))
        .execute(conn)
        .unwrap();

    for seed in 1..=n {
        let p = participant_fixture(&bracket_id, seed);
        diesel::insert_into(bracket_participants::table)
            .values((
                bracket_participants::id.eq(&p.id),
                bracket_participants::bracket_id.eq(&p.bracket_id),
                bracket_participants::athlete_id.eq(&p.athlete_id),
                bracket_participants::seed.eq(p.seed),
                bracket_participants::last_name.eq(&p.last_name),
                bracket_participants::first_name.eq(&p.first_name),
                bracket_participants::coaches.eq(p.coaches_json()),
            ))
            .execute(conn)
            .unwrap();
    }

    bracket_id
}

/// `athlete-{seed}` back to its seed.
pub fn seed_of(athlete_id: &str) -> i64 {
    athlete_id
        .strip_prefix("athlete-")
        .and_then(|s| s.parse().ok())
        .unwrap()
}
