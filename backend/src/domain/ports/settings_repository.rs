//! Port for the runtime key/value settings store.
//!
//! Services receive this port instead of reading a global, so amount locking
//! and UPI details can be exercised without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::SettingKey;

use super::define_port_error;

define_port_error! {
    /// Errors raised by settings repository adapters.
    pub enum SettingsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "settings repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "settings repository query failed: {message}",
    }
}

/// String-valued settings keyed by [`SettingKey`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Read a value; `None` when the key was never written.
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsRepositoryError>;

    /// Insert or replace a value.
    async fn put(&self, key: SettingKey, value: &str) -> Result<(), SettingsRepositoryError>;
}

/// In-memory settings store for tests and fixture wiring.
#[derive(Debug, Default)]
pub struct FixtureSettingsRepository {
    values: Mutex<HashMap<SettingKey, String>>,
}

impl FixtureSettingsRepository {
    /// Seed the store with initial values.
    pub fn with_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (SettingKey, V)>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SettingKey, String>>, SettingsRepositoryError>
    {
        self.values
            .lock()
            .map_err(|_| SettingsRepositoryError::query("fixture settings lock poisoned"))
    }
}

#[async_trait]
impl SettingsRepository for FixtureSettingsRepository {
    async fn get(&self, key: SettingKey) -> Result<Option<String>, SettingsRepositoryError> {
        Ok(self.lock()?.get(&key).cloned())
    }

    async fn put(&self, key: SettingKey, value: &str) -> Result<(), SettingsRepositoryError> {
        self.lock()?.insert(key, value.to_owned());
        Ok(())
    }
}
