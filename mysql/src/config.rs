//! Connection settings for the network engine.

use std::env;

use craftdb_core::{DbError, Result};

/// Fixed conventional server port; not a per-entity setting.
pub const DEFAULT_PORT: u16 = 3306;

/// Environment key naming the server host.
pub const ENV_DB_HOST: &str = "DB_HOST";
/// Environment key naming the database.
pub const ENV_DB_NAME: &str = "DB_NAME";
/// Environment key naming the user.
pub const ENV_DB_USER: &str = "DB_USER";
/// Environment key naming the password.
pub const ENV_DB_PASS: &str = "DB_PASS";

/// Connection settings for the network engine.
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    pub host: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl MysqlConfig {
    /// Settings for the given host, database, and credentials.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads the settings from `DB_HOST`, `DB_NAME`, `DB_USER`, and
    /// `DB_PASS`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Configuration`] naming the first missing
    /// variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: require(ENV_DB_HOST)?,
            database: require(ENV_DB_NAME)?,
            username: require(ENV_DB_USER)?,
            password: require(ENV_DB_PASS)?,
        })
    }
}

fn require(key: &str) -> Result<String> {
    env::var(key).map_err(|_| DbError::Configuration(format!("{key} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_round_trip() {
        // set_var/remove_var are unsafe in edition 2024; this test owns
        // the variables and runs both cases sequentially to avoid
        // racing a parallel test.
        unsafe {
            env::set_var(ENV_DB_HOST, "localhost");
            env::set_var(ENV_DB_NAME, "app");
            env::set_var(ENV_DB_USER, "app");
            env::set_var(ENV_DB_PASS, "secret");
        }
        let config = MysqlConfig::from_env().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.database, "app");
        assert_eq!(config.username, "app");
        assert_eq!(config.password, "secret");

        unsafe { env::remove_var(ENV_DB_PASS) };
        match MysqlConfig::from_env() {
            Err(DbError::Configuration(message)) => assert!(message.contains(ENV_DB_PASS)),
            other => panic!("expected configuration error, got {other:?}"),
        }
        unsafe {
            env::remove_var(ENV_DB_HOST);
            env::remove_var(ENV_DB_NAME);
            env::remove_var(ENV_DB_USER);
        }
    }
}
