//! MySQL/MariaDB source connector.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::{RowBatch, SourceConnection, Value};
use crate::error::{EtlError, Result};
use crate::source::Platform;

/// A single MySQL connection.
pub struct MysqlSource {
    conn: Option<Conn>,
}

impl MysqlSource {
    /// Open a connection to a MySQL source.
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let port = config.port.unwrap_or_else(|| Platform::Mysql.default_port());

        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(port)
            .db_name(Some(config.database.clone()))
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()));

        let conn = Conn::new(Opts::from(opts))
            .await
            .map_err(|e| EtlError::connection("mysql", e))?;

        info!(
            "Connected to MySQL source: {}:{}/{}",
            config.host, port, config.database
        );

        Ok(Self { conn: Some(conn) })
    }

    fn conn_mut(&mut self) -> Result<&mut Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| EtlError::connection("mysql", "connection already closed"))
    }
}

#[async_trait]
impl SourceConnection for MysqlSource {
    async fn fetch_all(&mut self, statement: &str) -> Result<RowBatch> {
        let conn = self.conn_mut()?;

        let rows: Vec<mysql_async::Row> = conn
            .query(statement)
            .await
            .map_err(|e| EtlError::extract(e))?;

        let mut batch = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(row.len());
            for idx in 0..row.len() {
                let raw = row.as_ref(idx).cloned().unwrap_or(mysql_async::Value::NULL);
                values.push(convert_value(raw));
            }
            batch.push(values);
        }

        debug!("Extracted {} rows from MySQL", batch.len());
        Ok(RowBatch::new(batch))
    }

    fn platform(&self) -> &str {
        "mysql"
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.disconnect()
                .await
                .map_err(|e| EtlError::connection("mysql", e))?;
        }
        Ok(())
    }
}

/// Convert a MySQL protocol value to the crate value type.
///
/// The protocol reports strings and blobs both as `Bytes`; valid UTF-8
/// becomes `Text`, anything else stays `Bytes`.
fn convert_value(value: mysql_async::Value) -> Value {
    use mysql_async::Value as My;

    match value {
        My::NULL => Value::Null,
        My::Int(v) => Value::I64(v),
        My::UInt(v) => match i64::try_from(v) {
            Ok(v) => Value::I64(v),
            Err(_) => Value::Decimal(Decimal::from(v)),
        },
        My::Float(v) => Value::F32(v),
        My::Double(v) => Value::F64(v),
        My::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Value::Text(text),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        My::Date(y, m, d, 0, 0, 0, 0) => {
            NaiveDate::from_ymd_opt(i32::from(y), u32::from(m), u32::from(d))
                .map(Value::Date)
                .unwrap_or(Value::Null)
        }
        My::Date(y, m, d, h, mi, s, us) => {
            NaiveDate::from_ymd_opt(i32::from(y), u32::from(m), u32::from(d))
                .and_then(|date| {
                    date.and_hms_micro_opt(u32::from(h), u32::from(mi), u32::from(s), us)
                })
                .map(Value::DateTime)
                .unwrap_or(Value::Null)
        }
        My::Time(false, 0, h, m, s, us) => {
            NaiveTime::from_hms_micro_opt(u32::from(h), u32::from(m), u32::from(s), us)
                .map(Value::Time)
                .unwrap_or(Value::Null)
        }
        // Durations beyond one day (or negative) have no NaiveTime form.
        My::Time(neg, days, h, m, s, us) => Value::Text(format_duration(neg, days, h, m, s, us)),
    }
}

fn format_duration(neg: bool, days: u32, h: u8, m: u8, s: u8, us: u32) -> String {
    let sign = if neg { "-" } else { "" };
    let hours = u32::from(h) + days * 24;
    if us == 0 {
        format!("{}{:02}:{:02}:{:02}", sign, hours, m, s)
    } else {
        format!("{}{:02}:{:02}:{:02}.{:06}", sign, hours, m, s, us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysql_async::Value as My;

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert_value(My::NULL), Value::Null);
        assert_eq!(convert_value(My::Int(-5)), Value::I64(-5));
        assert_eq!(convert_value(My::UInt(7)), Value::I64(7));
        assert_eq!(convert_value(My::Double(1.5)), Value::F64(1.5));
    }

    #[test]
    fn test_convert_uint_overflow() {
        assert_eq!(
            convert_value(My::UInt(u64::MAX)),
            Value::Decimal(Decimal::from(u64::MAX))
        );
    }

    #[test]
    fn test_convert_bytes_to_text() {
        assert_eq!(
            convert_value(My::Bytes(b"hello".to_vec())),
            Value::Text("hello".to_string())
        );
        assert_eq!(
            convert_value(My::Bytes(vec![0xff, 0xfe])),
            Value::Bytes(vec![0xff, 0xfe])
        );
    }

    #[test]
    fn test_convert_temporal() {
        assert_eq!(
            convert_value(My::Date(2024, 3, 1, 0, 0, 0, 0)),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(
            convert_value(My::Date(2024, 3, 1, 12, 30, 0, 0)),
            Value::DateTime(
                NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(12, 30, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            convert_value(My::Time(true, 2, 1, 0, 0, 0)),
            Value::Text("-49:00:00".to_string())
        );
    }
}
