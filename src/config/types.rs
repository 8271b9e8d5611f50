//! Configuration type definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration.
    pub source: SourceConfig,

    /// Target warehouse (PostgreSQL) configuration.
    pub target: TargetConfig,

    /// Extract/load statement pairs, run in order.
    #[serde(default)]
    pub queries: Vec<QuerySpec>,
}

/// Source database configuration.
///
/// Required keys beyond host/database/credentials are platform-specific and
/// go into `options`; the connectors pass them through to the underlying
/// driver without further validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Platform identifier ("mysql", "sqlserver", "firebird").
    pub platform: String,

    /// Database host.
    pub host: String,

    /// Database port; defaults per platform when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name (or database file path for Firebird).
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Extra driver-specific parameters (e.g. ODBC driver name, charset).
    #[serde(default)]
    pub options: HashMap<String, String>,
}

/// Target warehouse (PostgreSQL) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,
}

/// One extract/load statement pair as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Statement run against the source.
    pub extract: String,

    /// Parameterized statement run against the warehouse, once per row.
    pub load: String,
}

fn default_pg_port() -> u16 {
    5432
}
