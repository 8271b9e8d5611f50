//! Connection traits the orchestrator is written against.
//!
//! - [`SourceConnection`]: a live handle to a source database, produced by
//!   the connector factory and owned exclusively by the orchestrator.
//! - [`TargetWriter`]: a live handle to the warehouse, supplied by the
//!   caller and long-lived across a whole run.

use std::fmt;

use async_trait::async_trait;

use super::value::{RowBatch, Value};
use crate::error::Result;

/// A live connection to a source database.
///
/// Single-owner: the batch orchestrator holds the handle exclusively for the
/// duration of one run and releases it exactly once.
#[async_trait]
pub trait SourceConnection: Send {
    /// Execute an extract statement, materializing the full result set.
    ///
    /// No cursor streaming, no pagination; batches are bounded by design.
    async fn fetch_all(&mut self, statement: &str) -> Result<RowBatch>;

    /// Platform identifier for logging (e.g. "mysql").
    fn platform(&self) -> &str;

    /// Release the underlying connection. Idempotent; further `fetch_all`
    /// calls fail with a connection error.
    async fn close(&mut self) -> Result<()>;
}

impl fmt::Debug for dyn SourceConnection + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConnection")
            .field("platform", &self.platform())
            .finish()
    }
}

/// A live connection to the target warehouse.
///
/// The orchestrator never opens or closes the target; its lifecycle is the
/// caller's responsibility.
#[async_trait]
pub trait TargetWriter: Send {
    /// Execute a parameterized load statement once, binding `row` values
    /// positionally to its placeholders.
    async fn execute(&mut self, statement: &str, row: &[Value]) -> Result<u64>;
}
