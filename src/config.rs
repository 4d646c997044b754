use anyhow::{Context, Result};

pub const DEFAULT_PREFIX: &str = "www.ppa.in/";

/// Upper bound for `DEFAULT_TTL_DAYS` (a thousand years).
pub const MAX_TTL_DAYS: i64 = 365_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./ppalink.db"
    pub database_url: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Prefix placed in front of every generated code, e.g. "www.ppa.in/".
    /// The redirect route rebuilds the full short URL as prefix + path segment.
    pub short_url_prefix: String,

    /// Days until a freshly created mapping expires
    pub default_ttl_days: i64,

    /// How often the expiry sweeper purges expired mappings
    pub sweep_interval_secs: u64,

    /// Inserts tried per shorten call when a generated code is already taken.
    /// 1 means a collision is reported straight back to the caller.
    pub shorten_attempts: u32,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key → value source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3001".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let default_ttl_days = var("DEFAULT_TTL_DAYS")
            .unwrap_or_else(|| "20".into())
            .parse::<i64>()
            .context("DEFAULT_TTL_DAYS must be a whole number of days")?;
        if !(1..=MAX_TTL_DAYS).contains(&default_ttl_days) {
            anyhow::bail!("DEFAULT_TTL_DAYS must be between 1 and {MAX_TTL_DAYS}");
        }

        let sweep_interval_secs = var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|| "60".into())
            .parse::<u64>()
            .context("SWEEP_INTERVAL_SECS must be a positive number of seconds")?;
        if sweep_interval_secs == 0 {
            anyhow::bail!("SWEEP_INTERVAL_SECS must not be zero");
        }

        let shorten_attempts = var("SHORTEN_ATTEMPTS")
            .unwrap_or_else(|| "1".into())
            .parse::<u32>()
            .context("SHORTEN_ATTEMPTS must be a positive integer")?;
        if shorten_attempts == 0 {
            anyhow::bail!("SHORTEN_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite:./ppalink.db".into()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            short_url_prefix: var("SHORT_URL_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.into()),
            default_ttl_days,
            sweep_interval_secs,
            shorten_attempts,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 3001,
            short_url_prefix: DEFAULT_PREFIX.into(),
            default_ttl_days: 20,
            sweep_interval_secs: 60,
            shorten_attempts: 1,
        }
    }
}
