//! Typed application settings, loaded from `.env` and the process
//! environment via the `config` crate. `.env` is loaded first (if present),
//! then real process environment variables take precedence over anything
//! also set there — the same layering `dotenvy::dotenv()` gives any binary
//! that calls it before reading `std::env`.

use std::time::Duration;

use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    #[serde(rename = "db_host")]
    pub host: String,
    #[serde(rename = "db_port")]
    pub port: u16,
    #[serde(rename = "db_user")]
    pub username: String,
    #[serde(rename = "db_password", default)]
    pub password: String,
    #[serde(rename = "db_name")]
    pub database_name: String,
    pub postgres_max_open_conn: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub postgres_max_idle_time: Duration,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// Reads `.env` (if present) then layers the process environment on top,
/// falling back to the documented defaults for anything unset.
pub fn get_configuration() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .set_default("db_host", "localhost")?
        .set_default("db_port", 5432)?
        .set_default("db_user", "postgres")?
        .set_default("db_password", "")?
        .set_default("db_name", "rsshub")?
        .set_default("postgres_max_open_conn", 25)?
        .set_default("postgres_max_idle_time", "15m")?
        .add_source(
            config::Environment::default()
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let database = settings.try_deserialize::<DatabaseSettings>()?;
    Ok(Settings { database })
}
