//! Target warehouse (PostgreSQL) writer.
//!
//! The orchestrator treats the target as a caller-supplied [`TargetWriter`];
//! this module is the caller's half: a tokio-postgres connection with a
//! prepared-statement cache, so each descriptor's load statement is prepared
//! once and executed per row.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::{Client, NoTls, Statement};
use tracing::{info, warn};

use crate::config::TargetConfig;
use crate::core::{TargetWriter, Value};
use crate::error::{EtlError, Result};

/// A caller-owned warehouse connection.
pub struct PgWarehouse {
    client: Client,
    statements: HashMap<String, Statement>,
}

impl PgWarehouse {
    /// Open a warehouse connection.
    ///
    /// The caller owns the handle for the whole run; the orchestrator never
    /// opens or closes it. Dropping the handle releases the connection.
    pub async fn connect(config: &TargetConfig) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(&config.connection_string(), NoTls)
            .await
            .map_err(|e| EtlError::connection("postgres", e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("Warehouse connection task ended with error: {}", e);
            }
        });

        info!(
            "Connected to warehouse: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self {
            client,
            statements: HashMap::new(),
        })
    }

    async fn prepared(&mut self, statement: &str) -> Result<Statement> {
        if let Some(prepared) = self.statements.get(statement) {
            return Ok(prepared.clone());
        }

        let prepared = self
            .client
            .prepare(statement)
            .await
            .map_err(|e| EtlError::load(e))?;
        self.statements
            .insert(statement.to_string(), prepared.clone());
        Ok(prepared)
    }
}

#[async_trait]
impl TargetWriter for PgWarehouse {
    async fn execute(&mut self, statement: &str, row: &[Value]) -> Result<u64> {
        let prepared = self.prepared(statement).await?;

        let params: Vec<&(dyn ToSql + Sync)> =
            row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        self.client
            .execute(&prepared, &params)
            .await
            .map_err(|e| EtlError::load(e))
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::I16(v) => v.to_sql(ty, out),
            Value::I32(v) => v.to_sql(ty, out),
            Value::I64(v) => v.to_sql(ty, out),
            Value::F32(v) => v.to_sql(ty, out),
            Value::F64(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Decimal(v) => v.to_sql(ty, out),
            Value::DateTime(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
        }
    }

    // The column type is driven by the load statement, not by the value;
    // a genuine mismatch surfaces as a driver-level load error.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
