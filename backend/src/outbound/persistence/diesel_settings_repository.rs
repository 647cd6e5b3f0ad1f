//! PostgreSQL-backed `SettingsRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::SettingKey;
use crate::domain::ports::{SettingsRepository, SettingsRepositoryError};

use super::diesel_helpers::basic_error_mapping;
use super::models::NewSettingRow;
use super::pool::DbPool;
use super::schema::settings;

/// Key/value settings stored one row per key.
#[derive(Clone)]
pub struct DieselSettingsRepository {
    pool: DbPool,
}

impl DieselSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

basic_error_mapping!(SettingsRepositoryError);

#[async_trait]
impl SettingsRepository for DieselSettingsRepository {
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        settings::table
            .filter(settings::key.eq(key.as_str()))
            .select(settings::value)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn put(&self, key: SettingKey, value: &str) -> Result<(), SettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(settings::table)
            .values(&NewSettingRow {
                key: key.as_str(),
                value,
            })
            .on_conflict(settings::key)
            .do_update()
            .set((
                settings::value.eq(excluded(settings::value)),
                settings::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
