//! # warehouse-etl
//!
//! Cross-platform extract-and-load orchestrator.
//!
//! Moves result sets from a heterogeneous source database (MySQL, SQL
//! Server, or Firebird, selected at runtime) into one PostgreSQL warehouse
//! connection, processing a list of paired extract/load statements:
//!
//! - **Connector factory** resolving a platform identifier to a live source
//!   connection
//! - **Transfer executor** materializing each extract result and loading it
//!   row by row through a parameterized statement
//! - **Batch orchestrator** running descriptors in order with per-descriptor
//!   failure tolerance and guaranteed source teardown
//!
//! ## Example
//!
//! ```rust,no_run
//! use warehouse_etl::{orchestrator, Config, PgWarehouse, RunReport};
//!
//! #[tokio::main]
//! async fn main() -> warehouse_etl::Result<()> {
//!     let config = Config::load("etl.yaml")?;
//!     let mut target = PgWarehouse::connect(&config.target).await?;
//!
//!     let outcomes = orchestrator::run(
//!         &config.descriptors()?,
//!         &mut target,
//!         &config.source.platform,
//!         &config.source,
//!     )
//!     .await?;
//!
//!     let report = RunReport::from_outcomes(&outcomes);
//!     println!("Loaded {} rows, {} failures", report.rows_transferred, report.failed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod source;
pub mod target;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use crate::config::{Config, QuerySpec, SourceConfig, TargetConfig};
pub use crate::core::{QueryDescriptor, RowBatch, SourceConnection, TargetWriter, Value};
pub use crate::error::{EtlError, Result};
pub use crate::orchestrator::{run, run_with_source, RunReport};
pub use crate::source::{connect, Platform};
pub use crate::target::PgWarehouse;
pub use crate::transfer::{transfer, TransferOutcome, TransferStatus};
