use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use serp_common::Config;

const DEFAULT_PG_PORT: u16 = 5432;

/// Thin wrapper around a Postgres pool providing connection setup.
#[derive(Clone)]
pub struct AnalyticsClient {
    pub(crate) pool: PgPool,
}

impl AnalyticsClient {
    /// Connect using the analytics section of the config. Opens one
    /// connection eagerly so an unreachable store fails here, not on first use.
    pub async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.analytics_max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Build connect options from `ANALYTICS_ADDR` (`host[:port]`) and credentials.
pub fn connect_options(config: &Config) -> Result<PgConnectOptions, sqlx::Error> {
    let (host, port) = split_addr(&config.analytics_addr).ok_or_else(|| {
        sqlx::Error::Configuration(
            format!("invalid analytics address {:?}", config.analytics_addr).into(),
        )
    })?;

    Ok(PgConnectOptions::new()
        .host(host)
        .port(port)
        .username(&config.analytics_user)
        .password(&config.analytics_password)
        .database(&config.analytics_database))
}

fn split_addr(addr: &str) -> Option<(&str, u16)> {
    let addr = addr.trim();
    if addr.is_empty() {
        return None;
    }
    let (host, port) = match addr.rsplit_once(':') {
        // Bare IPv6 literal without brackets or port
        Some((host, _)) if host.contains(':') && !host.ends_with(']') => (addr, DEFAULT_PG_PORT),
        Some((host, port)) => (host, port.parse().ok()?),
        None => (addr, DEFAULT_PG_PORT),
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return None;
    }
    Some((host, port))
}
