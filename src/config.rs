use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

const DEFAULT_SPARK_ENDPOINT: &str = "ws://spark-api.xf-yun.com/v1.1/chat";

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,

    // Spark analysis service credentials
    pub spark_app_id: String,
    pub spark_api_key: String,
    pub spark_api_secret: String,
    pub spark_model: String,
    pub spark_endpoint: String,

    // Redis cache store
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u8,
    pub redis_password: Option<String>,

    // Poem corpus
    pub data_dir: PathBuf,

    pub analysis_cache_ttl: Duration,
    pub search_cache_ttl: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        // Missing credentials are not fatal here; they surface through
        // validate() on the health endpoint instead.
        let spark_app_id = env::var("SPARK_APP_ID").unwrap_or_default();
        let spark_api_key = env::var("SPARK_API_KEY").unwrap_or_default();
        let spark_api_secret = env::var("SPARK_API_SECRET").unwrap_or_default();
        let spark_model =
            env::var("SPARK_MODEL").unwrap_or_else(|_| "spark-lite-3.0".to_string());
        let spark_endpoint =
            env::var("SPARK_ENDPOINT").unwrap_or_else(|_| DEFAULT_SPARK_ENDPOINT.to_string());

        let redis_host = env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
        let redis_port = parse_env("REDIS_PORT", 6379u16)?;
        let redis_db = parse_env("REDIS_DB", 0u8)?;
        let redis_password = env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty());

        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        let analysis_cache_ttl =
            Duration::from_secs(parse_env("ANALYSIS_CACHE_TTL_HOURS", 24u64)? * 3600);
        let search_cache_ttl =
            Duration::from_secs(parse_env("SEARCH_CACHE_TTL_HOURS", 12u64)? * 3600);

        // Load server configuration with defaults
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_env("PORT", 8084u16)?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;
        let server_addr = SocketAddr::new(ip, port);

        Ok(Config {
            server_addr,
            spark_app_id,
            spark_api_key,
            spark_api_secret,
            spark_model,
            spark_endpoint,
            redis_host,
            redis_port,
            redis_db,
            redis_password,
            data_dir,
            analysis_cache_ttl,
            search_cache_ttl,
        })
    }

    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis_host, self.redis_port, self.redis_db
            ),
            None => format!(
                "redis://{}:{}/{}",
                self.redis_host, self.redis_port, self.redis_db
            ),
        }
    }

    /// Lists configuration problems without failing the process; the health
    /// endpoint reports them to operators.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.spark_app_id.is_empty() {
            errors.push("Spark app id is not configured".to_string());
        }
        if self.spark_api_key.is_empty() {
            errors.push("Spark API key is not configured".to_string());
        }
        if self.spark_api_secret.is_empty() {
            errors.push("Spark API secret is not configured".to_string());
        }
        if !self.data_dir.is_dir() {
            errors.push(format!(
                "Data directory does not exist: {}",
                self.data_dir.display()
            ));
        }

        errors
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
