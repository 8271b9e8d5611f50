//! Firebird source connector over ODBC.
//!
//! ODBC connection handles borrow the driver environment, so the connector
//! stores the environment plus a connection string and opens the physical
//! connection per statement. All values arrive through text row sets.

use std::sync::Arc;

use async_trait::async_trait;
use odbc_api::{buffers::TextRowSet, ConnectionOptions, Cursor, Environment};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::{RowBatch, SourceConnection, Value};
use crate::error::{EtlError, Result};
use crate::source::Platform;

/// Rows fetched per ODBC round trip.
const FETCH_BATCH_SIZE: usize = 1000;

/// Maximum bytes buffered per text column.
const MAX_COLUMN_BYTES: usize = 4096;

/// A Firebird source reached through the system ODBC driver.
pub struct FirebirdSource {
    env: Arc<Environment>,
    connection_string: String,
    closed: bool,
}

impl FirebirdSource {
    /// Open and verify an ODBC connection to a Firebird source.
    ///
    /// The credentials are checked up front; a failure here is fatal for the
    /// run and surfaces before any descriptor executes.
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let env = Environment::new().map_err(|e| {
            EtlError::connection(
                "firebird",
                format!(
                    "failed to create ODBC environment: {}. \
                     Make sure the Firebird ODBC driver is installed.",
                    e
                ),
            )
        })?;

        let connection_string = build_connection_string(config);

        // Scoped so the probe connection is dropped before env is moved.
        {
            env.connect_with_connection_string(&connection_string, ConnectionOptions::default())
                .map_err(|e| EtlError::connection("firebird", e))?;
        }

        info!(
            "Connected to Firebird source: {}:{}/{}",
            config.host,
            config.port.unwrap_or_else(|| Platform::Firebird.default_port()),
            config.database
        );

        Ok(Self {
            env: Arc::new(env),
            connection_string,
            closed: false,
        })
    }

    /// Execute a statement and materialize every row as text.
    fn execute_query(&self, statement: &str) -> Result<RowBatch> {
        let conn = self
            .env
            .connect_with_connection_string(&self.connection_string, ConnectionOptions::default())
            .map_err(|e| EtlError::connection("firebird", e))?;

        let mut rows = Vec::new();

        if let Some(mut cursor) = conn
            .execute(statement, ())
            .map_err(|e| EtlError::extract(e))?
        {
            let mut buffers =
                TextRowSet::for_cursor(FETCH_BATCH_SIZE, &mut cursor, Some(MAX_COLUMN_BYTES))
                    .map_err(|e| EtlError::extract(e))?;
            let mut row_cursor = cursor
                .bind_buffer(&mut buffers)
                .map_err(|e| EtlError::extract(e))?;

            while let Some(batch) = row_cursor.fetch().map_err(|e| EtlError::extract(e))? {
                for row_idx in 0..batch.num_rows() {
                    let mut row = Vec::with_capacity(batch.num_cols());
                    for col_idx in 0..batch.num_cols() {
                        let value = batch
                            .at(col_idx, row_idx)
                            .map(|bytes| Value::Text(String::from_utf8_lossy(bytes).to_string()))
                            .unwrap_or(Value::Null);
                        row.push(value);
                    }
                    rows.push(row);
                }
            }
        }

        Ok(RowBatch::new(rows))
    }
}

#[async_trait]
impl SourceConnection for FirebirdSource {
    async fn fetch_all(&mut self, statement: &str) -> Result<RowBatch> {
        if self.closed {
            return Err(EtlError::connection("firebird", "connection already closed"));
        }

        let batch = self.execute_query(statement)?;
        debug!("Extracted {} rows from Firebird", batch.len());
        Ok(batch)
    }

    fn platform(&self) -> &str {
        "firebird"
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Build an ODBC connection string.
///
/// The driver name defaults to `Firebird` and can be overridden via
/// `options.driver`; remaining options are appended verbatim.
fn build_connection_string(config: &SourceConfig) -> String {
    let driver = config
        .options
        .get("driver")
        .map(String::as_str)
        .unwrap_or("Firebird");
    let port = config
        .port
        .unwrap_or_else(|| Platform::Firebird.default_port());

    let mut s = format!(
        "Driver={{{}}};Server={};Port={};Database={};UID={};PWD={};",
        driver, config.host, port, config.database, config.user, config.password
    );

    for (key, value) in &config.options {
        if key != "driver" {
            s.push_str(&format!("{}={};", key, value));
        }
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_build_connection_string() {
        let config = SourceConfig {
            platform: "firebird".to_string(),
            host: "fb.internal".to_string(),
            port: None,
            database: "/data/warehouse.fdb".to_string(),
            user: "sysdba".to_string(),
            password: "masterkey".to_string(),
            options: HashMap::new(),
        };

        assert_eq!(
            build_connection_string(&config),
            "Driver={Firebird};Server=fb.internal;Port=3050;Database=/data/warehouse.fdb;\
             UID=sysdba;PWD=masterkey;"
        );
    }

    #[test]
    fn test_build_connection_string_custom_driver() {
        let mut options = HashMap::new();
        options.insert("driver".to_string(), "Firebird 5.0".to_string());

        let config = SourceConfig {
            platform: "firebird".to_string(),
            host: "fb.internal".to_string(),
            port: Some(3051),
            database: "dw".to_string(),
            user: "etl".to_string(),
            password: "secret".to_string(),
            options,
        };

        let s = build_connection_string(&config);
        assert!(s.starts_with("Driver={Firebird 5.0};Server=fb.internal;Port=3051;"));
    }
}
