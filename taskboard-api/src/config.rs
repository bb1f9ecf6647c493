/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS when `true` (default: false)
/// - `STORAGE`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 chars)
/// - `JWT_EXPIRATION_MINUTES`: Token lifetime, at most one year (default: 60)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter (read by the subscriber, not here)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};
use taskboard_shared::{auth::jwt::DEFAULT_EXPIRATION_MINUTES, db::pool};

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime (one year)
pub const MAX_JWT_EXPIRATION_MINUTES: i64 = 525_600;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Which store backs the services
    pub storage: StorageBackend,

    /// Database configuration, present when `storage` is postgres
    pub database: Option<DatabaseConfig>,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Log output format
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unknown STORAGE backend: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown LOG_FORMAT: {other}"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Pool settings with the shared defaults for everything not configured here
    pub fn pool_config(&self) -> pool::DatabaseConfig {
        pool::DatabaseConfig {
            max_connections: self.max_connections,
            ..pool::DatabaseConfig::new(self.url.clone())
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Lifetime of issued tokens
    pub expiration_minutes: i64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var("API_HOST", "0.0.0.0");
        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {e}"))?;

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let production = matches!(
            var("PRODUCTION", "false").trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        );

        let storage: StorageBackend = var("STORAGE", "postgres").parse()?;

        let database = match storage {
            StorageBackend::Postgres => {
                let url = lookup("DATABASE_URL").ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL environment variable is required")
                })?;
                let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
                    .parse::<u32>()
                    .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {e}"))?;

                Some(DatabaseConfig {
                    url,
                    max_connections,
                })
            }
            StorageBackend::Memory => None,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters long");
        }

        let expiration_minutes = var(
            "JWT_EXPIRATION_MINUTES",
            &DEFAULT_EXPIRATION_MINUTES.to_string(),
        )
        .parse::<i64>()
        .map_err(|e| anyhow::anyhow!("JWT_EXPIRATION_MINUTES is invalid: {e}"))?;

        if !(1..=MAX_JWT_EXPIRATION_MINUTES).contains(&expiration_minutes) {
            anyhow::bail!(
                "JWT_EXPIRATION_MINUTES must be between 1 and {MAX_JWT_EXPIRATION_MINUTES}"
            );
        }

        let log_format = var("LOG_FORMAT", "pretty").parse()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            storage,
            database,
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_minutes,
            },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}
