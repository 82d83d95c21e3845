//! Configuration module
//!
//! Settings are read from the process environment (after loading `.env` through
//! `dotenvy`). The API server needs the full set; the operator utilities only need
//! the database and storage settings, see [`StorageMigrationConfig`].

use std::env;
use std::path::PathBuf;

const SERVER_PORT: u16 = 3001;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 50;
const UPLOADS_DIR: &str = "uploads";
const MIN_ADMIN_API_KEY_LEN: usize = 32;

/// Marker found in every URL produced by the previous object-storage backend.
pub const DEFAULT_REMOTE_STORAGE_MARKER: &str = "amazonaws.com";

/// Database settings shared by the server and the migration utility
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        })
    }
}

/// API server configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database: DatabaseConfig,
    pub uploads_dir: PathBuf,
    pub max_upload_size_bytes: usize,
    pub admin_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            database: DatabaseConfig::from_env()?,
            uploads_dir: uploads_dir_from_env(),
            max_upload_size_bytes: upload_size_bytes(max_upload_size_mb)?,
            admin_api_key: env::var("ADMIN_API_KEY")
                .map_err(|_| anyhow::anyhow!("ADMIN_API_KEY must be set for the admin surface"))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.environment)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        if self.admin_api_key.len() < MIN_ADMIN_API_KEY_LEN {
            return Err(anyhow::anyhow!(
                "ADMIN_API_KEY must be at least {} characters long",
                MIN_ADMIN_API_KEY_LEN
            ));
        }
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }
        Ok(())
    }
}

/// Configuration for the storage URL migration utility
#[derive(Clone, Debug)]
pub struct StorageMigrationConfig {
    pub database: DatabaseConfig,
    pub uploads_dir: PathBuf,
    pub remote_markers: Vec<String>,
}

impl StorageMigrationConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let remote_markers = parse_remote_markers(env::var("REMOTE_STORAGE_MARKERS").ok());

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            uploads_dir: uploads_dir_from_env(),
            remote_markers,
        })
    }
}

fn uploads_dir_from_env() -> PathBuf {
    env::var("UPLOADS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(UPLOADS_DIR))
}

/// Megabytes to bytes, failing instead of wrapping on absurd values.
fn upload_size_bytes(megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", megabytes))
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

/// Parse a comma-separated marker list, falling back to the default marker.
pub fn parse_remote_markers(raw: Option<String>) -> Vec<String> {
    let markers: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if markers.is_empty() {
        vec![DEFAULT_REMOTE_STORAGE_MARKER.to_string()]
    } else {
        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 3001,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            database: DatabaseConfig {
                url: "postgres://localhost/staka".to_string(),
                max_connections: 5,
                timeout_seconds: 5,
            },
            uploads_dir: PathBuf::from("uploads"),
            max_upload_size_bytes: 1024,
            admin_api_key: "a".repeat(32),
        }
    }

    #[test]
    fn test_validate_accepts_development_defaults() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wildcard_cors_in_production() {
        let mut config = test_config();
        config.environment = "Production".to_string();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://staka-livres.fr".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_admin_key() {
        let mut config = test_config();
        config.admin_api_key = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upload_size_bytes_rejects_overflow() {
        assert_eq!(upload_size_bytes(50).unwrap(), 50 * 1024 * 1024);
        assert!(upload_size_bytes(usize::MAX / 1024).is_err());
    }

    #[test]
    fn test_parse_remote_markers() {
        assert_eq!(parse_remote_markers(None), vec!["amazonaws.com"]);
        assert_eq!(parse_remote_markers(Some(" , ".to_string())), vec!["amazonaws.com"]);
        assert_eq!(
            parse_remote_markers(Some("amazonaws.com, digitaloceanspaces.com".to_string())),
            vec!["amazonaws.com", "digitaloceanspaces.com"]
        );
    }
}
