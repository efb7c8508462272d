use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use diesel::{
    SqliteConnection,
    r2d2::{ConnectionManager, Pool},
};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Builds the connection pool. In-memory databases get a single connection
/// (every connection to `:memory:` is a distinct database).
pub fn build_pool(db_url: &str) -> DbPool {
    Pool::builder()
        .max_size(if db_url == ":memory:" { 1 } else { 10 })
        .build(ConnectionManager::<SqliteConnection>::new(db_url))
        .expect("failed to build the database pool")
}

/// Hands out one mutex per bracket. Callers must hold the bracket's lock
/// across `submit_result` and `regenerate` calls: two results which feed the
/// same next-round slot would otherwise race on the read-modify-write of
/// that slot, and regeneration must never interleave with result entry.
#[derive(Default)]
pub struct BracketLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl BracketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for the given bracket, creating it on first use.
    pub fn lock_for(&self, bracket_id: &str) -> Arc<Mutex<()>> {
        let mut map = self
            .inner
            .lock()
            .expect("bracket lock registry is poisoned");
        map.entry(bracket_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::BracketLocks;

    #[test]
    fn same_bracket_shares_a_lock() {
        let locks = BracketLocks::new();
        let a = locks.lock_for("b1");
        let b = locks.lock_for("b1");
        let c = locks.lock_for("b2");
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert!(!std::sync::Arc::ptr_eq(&a, &c));
    }
}
