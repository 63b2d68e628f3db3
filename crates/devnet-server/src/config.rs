//! Configuration loading and management

use std::path::Path;

use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./data/devnet.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Filesystem location of the database, if the URL names one
    pub fn file_path(&self) -> Option<&Path> {
        let path = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            None
        } else {
            Some(Path::new(path))
        }
    }
}

/// Authentication configuration
///
/// There is no built-in signing secret; one must come from the config file,
/// `DEVNET__AUTH__JWT_SECRET`, or `--jwt-secret`/`JWT_SECRET`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: devnet_auth::DEFAULT_TOKEN_EXPIRY_SECS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then `DEVNET__*`
    /// environment variables (e.g. `DEVNET__AUTH__JWT_SECRET`)
    ///
    /// Returns the config and whether the file was found, so the caller can
    /// report it once logging is up.
    pub fn load(path: &str) -> Result<(Self, bool)> {
        let file_found = Path::new(path).exists();

        let config: Config = config::Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("DEVNET")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration: {}", path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse configuration: {}", path))?;

        Ok((config, file_found))
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!(
                "auth.jwt_secret is not set; provide JWT_SECRET, --jwt-secret or DEVNET__AUTH__JWT_SECRET"
            );
        }
        if self.auth.token_expiry_secs <= 0 {
            anyhow::bail!("auth.token_expiry_secs must be positive");
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.token_expiry_secs, 360000);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.metrics.enabled);
        assert!(config.auth.jwt_secret.is_empty());
        assert!(config.validate().is_err());

        let mut config = config;
        config.auth.jwt_secret = "s3cret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let (config, file_found) = Config::load(path.to_str().unwrap()).unwrap();
        assert!(!file_found);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_no_secret_anywhere_fails_validation() {
        // Only meaningful when the environment does not provide one
        if std::env::var_os("DEVNET__AUTH__JWT_SECRET").is_some() {
            return;
        }

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 8080").unwrap();

        let (config, file_found) = Config::load(file.path().to_str().unwrap()).unwrap();
        assert!(file_found);
        assert!(config.auth.jwt_secret.is_empty());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080

[auth]
jwt_secret = "from-file"
"#
        )
        .unwrap();

        let (config, _) = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.jwt_secret, "from-file");
        assert_eq!(config.auth.token_expiry_secs, 360000);
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut config = Config::default();
        config.auth.jwt_secret = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_file_path() {
        let mut db = DatabaseConfig::default();
        assert_eq!(db.file_path(), Some(Path::new("./data/devnet.db")));

        db.url = "sqlite://tmp/x.db?mode=rwc".to_string();
        assert_eq!(db.file_path(), Some(Path::new("tmp/x.db")));

        db.url = "sqlite::memory:".to_string();
        assert_eq!(db.file_path(), None);
    }
}
