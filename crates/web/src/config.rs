use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Optional: without it the ephemeral stores run in-process only.
    pub redis_url: Option<String>,
    pub standings_cache_ttl_seconds: u64,
    pub idempotency_ttl_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            redis_url: std::env::var("REDIS_URL").ok(),
            standings_cache_ttl_seconds: optional_u64("STANDINGS_CACHE_TTL_SECONDS", 300)?,
            idempotency_ttl_seconds: optional_u64("IDEMPOTENCY_TTL_SECONDS", 600)?,
        })
    }
}

fn optional_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{name} must be a number")),
        Err(_) => Ok(default),
    }
}
