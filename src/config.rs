use serde::Deserialize;

use crate::auth::password::HashParams;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub password: HashParams,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparsable optional values fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let parsed = |key: &str| lookup(key).and_then(|v| v.parse::<u32>().ok());

        Ok(Self {
            database_url,
            max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(10),
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: lookup("APP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            password: HashParams {
                rounds: parsed("PASSWORD_HASH_ROUNDS").unwrap_or(HashParams::DEFAULT_ROUNDS),
                memory_kib: parsed("PASSWORD_HASH_MEMORY_KIB")
                    .unwrap_or(HashParams::DEFAULT_MEMORY_KIB),
            },
        })
    }
}
