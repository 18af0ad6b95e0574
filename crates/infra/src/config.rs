//! Configuration loading and representation.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults (`#[serde(default)]` on every section);
//! 2. a JSON file, `appsettings.json` or the path in `PEOPLE_CONFIG_FILE`
//!    (optional, skipped when missing);
//! 3. environment variables prefixed `PEOPLE_`, with `__` separating nested
//!    keys, e.g. `PEOPLE_CONNECTION_STRINGS__DEFAULT`.
//!
//! figment keys are case-sensitive and `Env` lowercases them, so every key is
//! spelled in lowercase in the JSON file too (`connection_strings.default`).

use figment::{
    Figment,
    providers::{Env, Format, Json},
};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_ENV: &str = "PEOPLE_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "appsettings.json";
pub const ENV_PREFIX: &str = "PEOPLE_";

/// Name of the connection string the service requires at startup.
pub const DEFAULT_CONNECTION: &str = "Default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// A required connection string is absent or blank.
    #[error("connection string '{0}' not found")]
    MissingConnectionString(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub connection_strings: ConnectionStrings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionStrings {
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

impl Settings {
    /// Load from the configured file (if any) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::figment(&path).extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    pub fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// The `Default` connection string. Absent or blank is a startup error.
    pub fn default_connection_string(&self) -> Result<&str, ConfigError> {
        self.connection_strings
            .default
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingConnectionString(DEFAULT_CONNECTION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_any_source() {
        Jail::expect_with(|_jail| {
            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.server.bind_address, "0.0.0.0:8080");
            assert!(matches!(
                settings.default_connection_string(),
                Err(ConfigError::MissingConnectionString("Default"))
            ));
            Ok(())
        });
    }

    #[test]
    fn reads_connection_string_from_json_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"{ "connection_strings": { "default": "postgres://file/db" } }"#,
            )?;
            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.default_connection_string().unwrap(), "postgres://file/db");
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.json",
                r#"{
                    "connection_strings": { "default": "postgres://file/db" },
                    "server": { "bind_address": "127.0.0.1:3000" }
                }"#,
            )?;
            jail.set_env(CONFIG_FILE_ENV, "custom.json");
            jail.set_env("PEOPLE_CONNECTION_STRINGS__DEFAULT", "postgres://env/db");

            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.default_connection_string().unwrap(), "postgres://env/db");
            assert_eq!(settings.server.bind_address, "127.0.0.1:3000");
            Ok(())
        });
    }

    #[test]
    fn environment_alone_supplies_the_connection_string() {
        Jail::expect_with(|jail| {
            jail.set_env("PEOPLE_CONNECTION_STRINGS__DEFAULT", "postgres://env/db");
            jail.set_env("PEOPLE_SERVER__BIND_ADDRESS", "127.0.0.1:9000");
            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.default_connection_string().unwrap(), "postgres://env/db");
            assert_eq!(settings.server.bind_address, "127.0.0.1:9000");
            Ok(())
        });
    }

    #[test]
    fn blank_connection_string_counts_as_missing() {
        Jail::expect_with(|jail| {
            jail.set_env("PEOPLE_CONNECTION_STRINGS__DEFAULT", "  ");
            let settings = Settings::load().map_err(|e| e.to_string())?;
            let err = settings.default_connection_string().unwrap_err();
            assert_eq!(err.to_string(), "connection string 'Default' not found");
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "{ not json")?;
            assert!(matches!(Settings::load(), Err(ConfigError::Invalid(_))));
            Ok(())
        });
    }
}
