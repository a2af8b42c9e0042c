// src/infrastructure/repositories/sqlite/migration.rs
use crate::infrastructure::repositories::sqlite::error::SqliteRepositoryError;
use diesel::sqlite::Sqlite;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info, instrument};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Runs all pending migrations and returns their names.
///
/// # Errors
///
/// Fails if pending migrations cannot be listed or one of them fails to apply.
#[instrument(skip(connection), level = "debug")]
pub fn run_migrations(
    connection: &mut impl MigrationHarness<Sqlite>,
) -> Result<Vec<String>, SqliteRepositoryError> {
    let pending = connection.pending_migrations(MIGRATIONS).map_err(|e| {
        SqliteRepositoryError::Migration(format!("Failed to get pending migrations: {}", e))
    })?;

    if pending.is_empty() {
        debug!("No pending migrations to run");
        return Ok(Vec::new());
    }

    let names: Vec<String> = pending.iter().map(|m| m.name().to_string()).collect();
    for name in &names {
        debug!("Pending Migration: {}", name);
    }

    connection.run_pending_migrations(MIGRATIONS).map_err(|e| {
        SqliteRepositoryError::Migration(format!("Failed to run pending migrations: {}", e))
    })?;

    info!("Applied {} migration(s)", names.len());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::setup_test_db;

    #[test]
    fn given_migrated_db_when_run_again_then_nothing_pending() {
        let db = setup_test_db();
        let mut conn = db.repository.get_connection().unwrap();

        let applied = run_migrations(&mut conn).unwrap();
        assert!(applied.is_empty());
    }
}
