//! Handles settings for the application. Configuration is read from
//! `settings.toml` in the working directory, then overridden by
//! `BUDGETRY_*` environment variables (`BUDGETRY_SERVER__PORT=8080`).
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "127.0.0.1"
//! port = 3000
//! database = { sqlite = "budgetry.db" }
//!
//! [cache]
//! enabled = true
//! ttl_secs = 3600
//! max_entries = 128
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// Chart cache. Entries live `ttl_secs` seconds, at most `max_entries` per
/// user.
#[derive(Debug, Deserialize)]
pub struct Cache {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default = "ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "max_entries")]
    pub max_entries: usize,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            enabled: enabled(),
            ttl_secs: ttl_secs(),
            max_entries: max_entries(),
        }
    }
}

impl From<&Cache> for server::CacheOptions {
    fn from(cache: &Cache) -> Self {
        Self {
            enabled: cache.enabled,
            ttl: std::time::Duration::from_secs(cache.ttl_secs),
            max_entries: cache.max_entries,
        }
    }
}

fn enabled() -> bool {
    true
}

fn ttl_secs() -> u64 {
    3600
}

fn max_entries() -> usize {
    128
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub cache: Cache,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("BUDGETRY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn sqlite_server_with_defaults() {
        let settings = parse(
            r#"
            [server]
            port = 8080
            database = { sqlite = "budgetry.db" }
            "#,
        );
        assert_eq!(settings.app.level, "info");
        assert!(settings.cache.enabled);
        assert_eq!(
            server::CacheOptions::from(&settings.cache),
            server::CacheOptions::default()
        );
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert!(server.bind.is_none());
        assert!(matches!(server.database, Database::Sqlite(path) if path == "budgetry.db"));
    }

    #[test]
    fn memory_database_and_tuned_cache() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = "memory"

            [cache]
            enabled = false
            ttl_secs = 60
            max_entries = 4
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert!(!settings.cache.enabled);
        let options = server::CacheOptions::from(&settings.cache);
        assert_eq!(options.ttl, std::time::Duration::from_secs(60));
        assert_eq!(options.max_entries, 4);
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }

    #[test]
    fn server_section_is_optional() {
        assert!(parse("").server.is_none());
    }
}
