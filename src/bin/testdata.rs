//! Seeds a database with demo brackets for local development.

use clap::Parser;
use diesel::prelude::*;
use diesel::{Connection, RunQueryDsl, dsl::now};
use diesel_migrations::MigrationHarness;
use tatami::MIGRATIONS;
use tatami::brackets::{
    KIND_ROUND_ROBIN, KIND_SINGLE_ELIMINATION, Participant, regenerate,
    round_robin,
};
use tatami::msg;
use tatami::schema::{bracket_participants, brackets};
use uuid::Uuid;

#[derive(Parser)]
pub struct Seed {
    database_url: Option<String>,
    /// Number of athletes in the demo elimination bracket.
    #[clap(long, default_value_t = 11)]
    entrants: i64,
    /// Athletes per round-robin pool.
    #[clap(long, default_value_t = 4)]
    pool_size: usize,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Seed::parse();
    let db_url = if let Some(url) = args.database_url {
        url
    } else {
        std::env::var("DATABASE_URL").expect(
            "please either set `DATABASE_URL` or pass the database url as \
             the first argument",
        )
    };

    let mut conn = diesel::SqliteConnection::establish(&db_url).unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();

    let (msgs, _rx) = msg::channel();

    let elimination = insert_bracket(
        &mut conn,
        "seniors-73kg",
        0,
        KIND_SINGLE_ELIMINATION,
        true,
        1,
    );
    let entrants = demo_entrants(&elimination, args.entrants);
    insert_participants(&mut conn, &entrants);
    regenerate::regenerate(&elimination, &msgs, &mut conn).unwrap();
    tracing::info!(
        bracket_id = %elimination,
        entrants = args.entrants,
        "seeded elimination bracket"
    );

    // one category split into seeded pools
    let pool_entrants = demo_entrants("unassigned", 8);
    for (group, pool) in round_robin::plan_pools(&pool_entrants, args.pool_size)
        .unwrap()
        .into_iter()
        .enumerate()
    {
        let bracket_id = insert_bracket(
            &mut conn,
            "juniors-66kg",
            group as i64,
            KIND_ROUND_ROBIN,
            false,
            2,
        );
        // seeds are dense within each bracket, so re-seed per pool
        let pool: Vec<Participant> = pool
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                Participant::new(
                    &bracket_id,
                    &p.athlete_id,
                    (i + 1) as i64,
                    &p.last_name,
                    &p.first_name,
                    &p.coaches(),
                )
            })
            .collect();
        insert_participants(&mut conn, &pool);
        regenerate::regenerate(&bracket_id, &msgs, &mut conn).unwrap();
        tracing::info!(bracket_id = %bracket_id, group, "seeded round-robin pool");
    }
}

fn demo_entrants(bracket_id: &str, n: i64) -> Vec<Participant> {
    (1..=n)
        .map(|seed| {
            Participant::new(
                bracket_id,
                &format!("athlete-{seed}"),
                seed,
                &format!("Fighter{seed}"),
                "Demo",
                &["Sensei".to_string()],
            )
        })
        .collect()
}

fn insert_bracket(
    conn: &mut SqliteConnection,
    category: &str,
    group_id: i64,
    kind: &str,
    repechage: bool,
    tatami: i64,
) -> String {
    let id = Uuid::now_v7().to_string();
    diesel::insert_into(brackets::table)
        .values((
            brackets::id.eq(&id),
            brackets::category_id.eq(category),
            brackets::group_id.eq(group_id),
            brackets::kind.eq(kind),
            brackets::status.eq("P"),
            brackets::repechage.eq(repechage),
            brackets::tatami.eq(Some(tatami)),
            brackets::created_at.eq(now),
        ))
        .execute(conn)
        .unwrap();
    id
}

fn insert_participants(conn: &mut SqliteConnection, entrants: &[Participant]) {
    let rows: Vec<_> = entrants
        .iter()
        .map(|p| {
            (
                bracket_participants::id.eq(&p.id),
                bracket_participants::bracket_id.eq(&p.bracket_id),
                bracket_participants::athlete_id.eq(&p.athlete_id),
                bracket_participants::seed.eq(p.seed),
                bracket_participants::last_name.eq(&p.last_name),
                bracket_participants::first_name.eq(&p.first_name),
                bracket_participants::coaches.eq(p.coaches_json()),
            )
        })
        .collect();
    diesel::insert_into(bracket_participants::table)
        .values(&rows)
        .execute(conn)
        .unwrap();
}
