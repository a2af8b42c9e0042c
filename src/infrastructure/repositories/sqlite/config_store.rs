// src/infrastructure/repositories/sqlite/config_store.rs

use diesel::prelude::*;
use tracing::{debug, instrument};

use super::connection::{ConnectionPool, PooledConnection};
use super::error::{SqliteRepositoryError, SqliteResult};
use super::model::DbSetting;
use super::schema::internal_settings;
use crate::domain::error::DomainResult;
use crate::domain::repositories::config_store::ConfigStore;

/// Runtime settings kept in the `internal_settings` table
#[derive(Clone, Debug)]
pub struct SqliteConfigStore {
    pool: ConnectionPool,
}

impl SqliteConfigStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    fn get_connection(&self) -> SqliteResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| SqliteRepositoryError::Pool(e.to_string()))
    }
}

impl ConfigStore for SqliteConfigStore {
    #[instrument(skip(self), level = "trace")]
    fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let mut conn = self.get_connection()?;

        let value = internal_settings::table
            .filter(internal_settings::name.eq(key))
            .select(internal_settings::value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(SqliteRepositoryError::Query)?;

        Ok(value)
    }

    #[instrument(skip(self), level = "debug")]
    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        let mut conn = self.get_connection()?;

        diesel::insert_into(internal_settings::table)
            .values(&DbSetting {
                name: key.to_string(),
                value: value.to_string(),
            })
            .on_conflict(internal_settings::name)
            .do_update()
            .set(internal_settings::value.eq(value))
            .execute(&mut conn)
            .map_err(SqliteRepositoryError::Query)?;

        debug!("Stored setting {} = {}", key, value);
        Ok(())
    }
}
