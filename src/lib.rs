use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod brackets;
pub mod error;
pub mod msg;
pub mod schema;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
