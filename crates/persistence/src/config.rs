//! Database endpoint configuration
//!
//! Layered as: defaults → JSON file → `KIMBANK_DB_*` environment variables →
//! command-line flags (applied by the binary).

use crate::error::{PersistenceError, PersistenceResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// TLS mode of the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    #[default]
    Disable,
    Prefer,
    Require,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        }
    }

    pub fn parse(s: &str) -> PersistenceResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            other => Err(PersistenceError::Configuration(format!(
                "unknown sslmode '{}', expected disable, prefer or require",
                other
            ))),
        }
    }
}

/// Where the bank database lives and how the client talks to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default)]
    pub sslmode: SslMode,

    /// Schema selected with `SET search_path` after connecting
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Channel the notification listener subscribes to
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Idle time before the listener pings its connection
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_password() -> String {
    "postgres".to_string()
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_schema() -> String {
    "kim_bank".to_string()
}

fn default_channel() -> String {
    "raise_notice".to_string()
}

fn default_keepalive_secs() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: default_password(),
            database: default_database(),
            sslmode: SslMode::default(),
            schema: default_schema(),
            channel: default_channel(),
            keepalive_secs: default_keepalive_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl DbConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> PersistenceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Override fields from `KIMBANK_DB_*` environment variables
    pub fn apply_env(&mut self) -> PersistenceResult<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup (the environment in production)
    pub fn apply_vars<F>(&mut self, lookup: F) -> PersistenceResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("KIMBANK_DB_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("KIMBANK_DB_PORT") {
            self.port = port.trim().parse().map_err(|_| {
                PersistenceError::Configuration(format!("invalid KIMBANK_DB_PORT '{}'", port))
            })?;
        }
        if let Some(user) = lookup("KIMBANK_DB_USER") {
            self.user = user;
        }
        if let Some(password) = lookup("KIMBANK_DB_PASSWORD") {
            self.password = password;
        }
        if let Some(database) = lookup("KIMBANK_DB_NAME") {
            self.database = database;
        }
        if let Some(sslmode) = lookup("KIMBANK_DB_SSLMODE") {
            self.sslmode = SslMode::parse(&sslmode)?;
        }
        if let Some(schema) = lookup("KIMBANK_DB_SCHEMA") {
            self.schema = schema;
        }
        if let Some(channel) = lookup("KIMBANK_DB_CHANNEL") {
            self.channel = channel;
        }
        Ok(())
    }

    /// Reject settings the client cannot honour
    pub fn validate(&self) -> PersistenceResult<()> {
        if self.host.trim().is_empty() {
            return Err(PersistenceError::Configuration("host is empty".to_string()));
        }
        if self.schema.trim().is_empty() {
            return Err(PersistenceError::Configuration("schema is empty".to_string()));
        }
        if self.channel.trim().is_empty() {
            return Err(PersistenceError::Configuration("channel is empty".to_string()));
        }
        if self.keepalive_secs == 0 {
            return Err(PersistenceError::Configuration(
                "keepalive_secs must be positive".to_string(),
            ));
        }
        // Connections are made with NoTls.
        if self.sslmode == SslMode::Require {
            return Err(PersistenceError::Configuration(
                "sslmode=require is not supported: the client has no TLS connector".to_string(),
            ));
        }
        Ok(())
    }

    /// Idle interval of the notification listener
    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Build the tokio-postgres connection config
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.database)
            .application_name("kimbank")
            .connect_timeout(self.connect_timeout())
            .ssl_mode(match self.sslmode {
                SslMode::Disable => tokio_postgres::config::SslMode::Disable,
                SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
                SslMode::Require => tokio_postgres::config::SslMode::Require,
            });
        config
    }

    /// Endpoint description for logs, without the password
    pub fn describe(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{} (sslmode={}, schema={})",
            self.user,
            self.host,
            self.port,
            self.database,
            self.sslmode.as_str(),
            self.schema
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.schema, "kim_bank");
        assert_eq!(config.channel, "raise_notice");
        assert_eq!(config.keepalive(), Duration::from_secs(300));
        assert_eq!(config.sslmode, SslMode::Disable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"host": "db.internal", "port": 6432, "sslmode": "prefer"}}"#
        )
        .unwrap();

        let config = DbConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6432);
        assert_eq!(config.sslmode, SslMode::Prefer);
        assert_eq!(config.user, "postgres");
        assert_eq!(config.keepalive_secs, 300);
    }

    #[test]
    fn test_from_file_errors() {
        let missing = DbConfig::from_file(Path::new("/nonexistent/kimbank.json"));
        assert!(matches!(missing, Err(PersistenceError::ConfigFile(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let broken = DbConfig::from_file(file.path());
        assert!(matches!(broken, Err(PersistenceError::ConfigParse(_))));
    }

    #[test]
    fn test_apply_vars() {
        let vars: HashMap<&str, &str> = [
            ("KIMBANK_DB_HOST", "10.0.0.5"),
            ("KIMBANK_DB_PORT", "5433"),
            ("KIMBANK_DB_SCHEMA", "other_bank"),
            ("KIMBANK_DB_SSLMODE", "PREFER"),
        ]
        .into_iter()
        .collect();

        let mut config = DbConfig::default();
        config
            .apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 5433);
        assert_eq!(config.schema, "other_bank");
        assert_eq!(config.sslmode, SslMode::Prefer);
        assert_eq!(config.database, "postgres");
    }

    #[test]
    fn test_apply_vars_rejects_bad_port() {
        let mut config = DbConfig::default();
        let result = config.apply_vars(|key| {
            (key == "KIMBANK_DB_PORT").then(|| "fifty".to_string())
        });
        assert!(matches!(result, Err(PersistenceError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_require_and_empty_fields() {
        let config = DbConfig {
            sslmode: SslMode::Require,
            ..DbConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DbConfig {
            schema: " ".to_string(),
            ..DbConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DbConfig {
            keepalive_secs: 0,
            ..DbConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_describe_hides_password() {
        let config = DbConfig {
            password: "hunter2".to_string(),
            ..DbConfig::default()
        };
        let text = config.describe();
        assert!(!text.contains("hunter2"));
        assert_eq!(
            text,
            "postgres://postgres@localhost:5432/postgres (sslmode=disable, schema=kim_bank)"
        );
    }

    #[test]
    fn test_sslmode_parse() {
        assert_eq!(SslMode::parse("disable").unwrap(), SslMode::Disable);
        assert!(SslMode::parse("verify-full").is_err());
    }
}
