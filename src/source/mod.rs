//! Source connectors and the platform dispatch factory.

mod firebird;
mod mssql;
mod mysql;

pub use firebird::FirebirdSource;
pub use mssql::MssqlSource;
pub use mysql::MysqlSource;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::SourceConfig;
use crate::core::SourceConnection;
use crate::error::{EtlError, Result};

/// Supported source platforms.
///
/// The set is fixed here; extending it means adding a connector module and a
/// dispatch arm, without touching the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// MySQL / MariaDB.
    Mysql,
    /// Microsoft SQL Server.
    Sqlserver,
    /// Firebird (via ODBC).
    Firebird,
}

impl Platform {
    /// Canonical identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Mysql => "mysql",
            Platform::Sqlserver => "sqlserver",
            Platform::Firebird => "firebird",
        }
    }

    /// Default TCP port for the platform.
    pub fn default_port(&self) -> u16 {
        match self {
            Platform::Mysql => 3306,
            Platform::Sqlserver => 1433,
            Platform::Firebird => 3050,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Platform::Mysql),
            "sqlserver" | "mssql" => Ok(Platform::Sqlserver),
            "firebird" => Ok(Platform::Firebird),
            _ => Err(EtlError::UnsupportedPlatform(s.to_string())),
        }
    }
}

/// Resolve a platform identifier to a live source connection.
///
/// An identifier outside the known set fails with
/// [`EtlError::UnsupportedPlatform`] before any connection is attempted;
/// this is a configuration error, not a retriable condition. Driver-level
/// connection failures propagate as [`EtlError::Connection`] with no retry
/// or backoff. The factory keeps no record of issued handles.
pub async fn connect(platform: &str, config: &SourceConfig) -> Result<Box<dyn SourceConnection>> {
    let platform = platform.parse::<Platform>()?;
    debug!("Resolving {} source connector", platform);

    match platform {
        Platform::Mysql => Ok(Box::new(MysqlSource::connect(config).await?)),
        Platform::Sqlserver => Ok(Box::new(MssqlSource::connect(config).await?)),
        Platform::Firebird => Ok(Box::new(FirebirdSource::connect(config).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source_config(platform: &str) -> SourceConfig {
        SourceConfig {
            platform: platform.to_string(),
            host: "localhost".to_string(),
            port: None,
            database: "db".to_string(),
            user: "u".to_string(),
            password: "p".to_string(),
            options: HashMap::new(),
        }
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("mysql".parse::<Platform>().unwrap(), Platform::Mysql);
        assert_eq!("SQLServer".parse::<Platform>().unwrap(), Platform::Sqlserver);
        assert_eq!("mssql".parse::<Platform>().unwrap(), Platform::Sqlserver);
        assert_eq!("firebird".parse::<Platform>().unwrap(), Platform::Firebird);
        assert!(matches!(
            "oracle".parse::<Platform>(),
            Err(EtlError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(Platform::Mysql.default_port(), 3306);
        assert_eq!(Platform::Sqlserver.default_port(), 1433);
        assert_eq!(Platform::Firebird.default_port(), 3050);
    }

    #[tokio::test]
    async fn test_connect_unknown_platform_fails_before_connecting() {
        let err = connect("oracle", &source_config("oracle")).await.unwrap_err();
        match err {
            EtlError::UnsupportedPlatform(p) => assert_eq!(p, "oracle"),
            other => panic!("expected UnsupportedPlatform, got {}", other),
        }
    }
}
