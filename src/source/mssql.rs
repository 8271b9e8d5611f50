//! Microsoft SQL Server source connector over the TDS protocol.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, FromSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::{RowBatch, SourceConnection, Value};
use crate::error::{EtlError, Result};
use crate::source::Platform;

/// A single SQL Server connection.
pub struct MssqlSource {
    client: Option<Client<Compat<TcpStream>>>,
}

impl MssqlSource {
    /// Open a connection to a SQL Server source.
    ///
    /// Encryption is off unless `options.encrypt` says otherwise;
    /// `options.trust_server_cert = "true"` skips certificate validation.
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let port = config
            .port
            .unwrap_or_else(|| Platform::Sqlserver.default_port());

        let mut tds = Config::new();
        tds.host(&config.host);
        tds.port(port);
        tds.database(&config.database);
        tds.authentication(AuthMethod::sql_server(&config.user, &config.password));

        match config.options.get("encrypt").map(String::as_str) {
            Some("true") | Some("yes") | Some("1") => {
                if config.options.get("trust_server_cert").map(String::as_str) == Some("true") {
                    tds.trust_cert();
                }
                tds.encryption(EncryptionLevel::Required);
            }
            _ => {
                tds.encryption(EncryptionLevel::NotSupported);
            }
        }

        let tcp = TcpStream::connect(tds.get_addr())
            .await
            .map_err(|e| EtlError::connection("sqlserver", e))?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(tds, tcp.compat_write())
            .await
            .map_err(|e| EtlError::connection("sqlserver", e))?;

        info!(
            "Connected to SQL Server source: {}:{}/{}",
            config.host, port, config.database
        );

        Ok(Self {
            client: Some(client),
        })
    }

    fn client_mut(&mut self) -> Result<&mut Client<Compat<TcpStream>>> {
        self.client
            .as_mut()
            .ok_or_else(|| EtlError::connection("sqlserver", "connection already closed"))
    }
}

#[async_trait]
impl SourceConnection for MssqlSource {
    async fn fetch_all(&mut self, statement: &str) -> Result<RowBatch> {
        let client = self.client_mut()?;

        let stream = client
            .simple_query(statement)
            .await
            .map_err(|e| EtlError::extract(e))?;
        let results = stream
            .into_results()
            .await
            .map_err(|e| EtlError::extract(e))?;

        let mut rows = Vec::new();
        for row in results.into_iter().flatten() {
            let mut values = Vec::with_capacity(row.len());
            for data in row.into_iter() {
                values.push(convert_value(data)?);
            }
            rows.push(values);
        }

        debug!("Extracted {} rows from SQL Server", rows.len());
        Ok(RowBatch::new(rows))
    }

    fn platform(&self) -> &str {
        "sqlserver"
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| EtlError::connection("sqlserver", e))?;
        }
        Ok(())
    }
}

/// Convert a TDS column value to the crate value type.
fn convert_value(data: ColumnData<'static>) -> Result<Value> {
    let value = match data {
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::U8(v) => v.map(|v| Value::I16(i16::from(v))).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(Value::I16).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(Value::I32).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::I64).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(Value::F32).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::F64).unwrap_or(Value::Null),
        ColumnData::Guid(v) => v.map(Value::Uuid).unwrap_or(Value::Null),
        ColumnData::String(v) => v.map(|s| Value::Text(s.into_owned())).unwrap_or(Value::Null),
        ColumnData::Binary(v) => v.map(|b| Value::Bytes(b.into_owned())).unwrap_or(Value::Null),
        ColumnData::Xml(v) => v
            .map(|x| Value::Text(x.into_owned().to_string()))
            .unwrap_or(Value::Null),
        data @ ColumnData::Numeric(_) => Decimal::from_sql(&data)
            .map_err(|e| EtlError::extract(e))?
            .map(Value::Decimal)
            .unwrap_or(Value::Null),
        data @ (ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_)) => {
            NaiveDateTime::from_sql(&data)
                .map_err(|e| EtlError::extract(e))?
                .map(Value::DateTime)
                .unwrap_or(Value::Null)
        }
        data @ ColumnData::Date(_) => NaiveDate::from_sql(&data)
            .map_err(|e| EtlError::extract(e))?
            .map(Value::Date)
            .unwrap_or(Value::Null),
        data @ ColumnData::Time(_) => NaiveTime::from_sql(&data)
            .map_err(|e| EtlError::extract(e))?
            .map(Value::Time)
            .unwrap_or(Value::Null),
        data @ ColumnData::DateTimeOffset(_) => DateTime::<Utc>::from_sql(&data)
            .map_err(|e| EtlError::extract(e))?
            .map(|dt| Value::DateTime(dt.naive_utc()))
            .unwrap_or(Value::Null),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert_value(ColumnData::I32(Some(7))).unwrap(), Value::I32(7));
        assert_eq!(convert_value(ColumnData::I32(None)).unwrap(), Value::Null);
        assert_eq!(
            convert_value(ColumnData::Bit(Some(true))).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            convert_value(ColumnData::U8(Some(255))).unwrap(),
            Value::I16(255)
        );
    }

    #[test]
    fn test_convert_text_and_binary() {
        assert_eq!(
            convert_value(ColumnData::String(Some(Cow::Borrowed("abc")))).unwrap(),
            Value::Text("abc".to_string())
        );
        assert_eq!(
            convert_value(ColumnData::Binary(Some(Cow::Borrowed(&[1u8, 2][..])))).unwrap(),
            Value::Bytes(vec![1, 2])
        );
    }
}
