use std::str::FromStr;

use otp_core::error::ConfigError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

pub const DEFAULT_PORT: u16 = 5432;

/// Connection settings for the user and OTP store.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: Option<u32>,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Read `DB_HOST`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_PORT` and
    /// `DB_MAX_CONNECTIONS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required =
            |name: &str| lookup(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));

        Ok(Self {
            host: required("DB_HOST")?,
            database: required("DB_NAME")?,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            port: parse_optional(&lookup, "DB_PORT")?.unwrap_or(DEFAULT_PORT),
            max_connections: parse_optional(&lookup, "DB_MAX_CONNECTIONS")?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        match self.max_connections {
            Some(max) => PgPoolOptions::new().max_connections(max),
            None => PgPoolOptions::new(),
        }
    }
}

fn parse_optional<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|value| {
            value.parse::<T>().map_err(|e| ConfigError::InvalidVar {
                name: name.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
