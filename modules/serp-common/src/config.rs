use std::env;
use std::time::Duration;

use typed_builder::TypedBuilder;

use crate::error::ConfigError;

pub const DEFAULT_ANALYTICS_ADDR: &str = "localhost:9000";
pub const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_WORKER_ADDR: &str = "0.0.0.0:9080";

/// Worker configuration loaded from environment variables.
///
/// Resolved once by the entry point and handed to the connection manager.
/// Every field has a fallback so a bare local setup works without any env.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Config {
    // Analytics store (Postgres)
    #[builder(default = DEFAULT_ANALYTICS_ADDR.to_string(), setter(into))]
    pub analytics_addr: String,
    #[builder(default = "default".to_string(), setter(into))]
    pub analytics_database: String,
    #[builder(default = "default".to_string(), setter(into))]
    pub analytics_user: String,
    #[builder(default, setter(into))]
    pub analytics_password: String,
    #[builder(default = 10)]
    pub analytics_max_connections: u32,

    // Graph store (Neo4j)
    #[builder(default = DEFAULT_NEO4J_URI.to_string(), setter(into))]
    pub neo4j_uri: String,
    #[builder(default = "neo4j".to_string(), setter(into))]
    pub neo4j_user: String,
    #[builder(default = "password".to_string(), setter(into))]
    pub neo4j_password: String,

    /// Dial timeout applied to both stores.
    #[builder(default = Duration::from_secs(10))]
    pub connect_timeout: Duration,

    // Restate endpoint
    #[builder(default = DEFAULT_WORKER_ADDR.to_string(), setter(into))]
    pub worker_addr: String,
    #[builder(default, setter(strip_option, into))]
    pub restate_identity_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    /// Unset or empty variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            analytics_addr: get("ANALYTICS_ADDR").unwrap_or(defaults.analytics_addr),
            analytics_database: get("ANALYTICS_DATABASE").unwrap_or(defaults.analytics_database),
            analytics_user: get("ANALYTICS_USER").unwrap_or(defaults.analytics_user),
            analytics_password: get("ANALYTICS_PASSWORD").unwrap_or(defaults.analytics_password),
            analytics_max_connections: match get("ANALYTICS_MAX_CONNECTIONS") {
                Some(v) => parse_positive("ANALYTICS_MAX_CONNECTIONS", v)?,
                None => defaults.analytics_max_connections,
            },
            neo4j_uri: get("NEO4J_URI").unwrap_or(defaults.neo4j_uri),
            neo4j_user: get("NEO4J_USER").unwrap_or(defaults.neo4j_user),
            neo4j_password: get("NEO4J_PASSWORD").unwrap_or(defaults.neo4j_password),
            connect_timeout: match get("STORE_CONNECT_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse_positive("STORE_CONNECT_TIMEOUT_SECS", v)?),
                None => defaults.connect_timeout,
            },
            worker_addr: get("WORKER_ADDR").unwrap_or(defaults.worker_addr),
            restate_identity_key: get("RESTATE_IDENTITY_KEY"),
        })
    }

    /// Log the resolved config with secrets reduced to a preview.
    pub fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            if val.is_empty() {
                return "<not set>".to_string();
            }
            let n = val.chars().count().min(3);
            let head: String = val.chars().take(n).collect();
            format!("{head}...({} chars)", val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  ANALYTICS_ADDR: {}", self.analytics_addr);
        tracing::info!("  ANALYTICS_DATABASE: {}", self.analytics_database);
        tracing::info!("  ANALYTICS_USER: {}", self.analytics_user);
        tracing::info!("  ANALYTICS_PASSWORD: {}", preview(&self.analytics_password));
        tracing::info!("  ANALYTICS_MAX_CONNECTIONS: {}", self.analytics_max_connections);
        tracing::info!("  NEO4J_URI: {}", self.neo4j_uri);
        tracing::info!("  NEO4J_USER: {}", self.neo4j_user);
        tracing::info!("  NEO4J_PASSWORD: {}", preview(&self.neo4j_password));
        tracing::info!(
            "  STORE_CONNECT_TIMEOUT_SECS: {}",
            self.connect_timeout.as_secs()
        );
        tracing::info!("  WORKER_ADDR: {}", self.worker_addr);
        tracing::info!(
            "  RESTATE_IDENTITY_KEY: {}",
            preview(self.restate_identity_key.as_deref().unwrap_or_default())
        );
    }
}

/// Parse a count or duration that must be at least 1.
fn parse_positive<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    match value.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            expected: "a positive integer",
        }),
    }
}
