//! Database-agnostic core types: values, row batches, query descriptors,
//! and the connection traits the orchestrator is written against.

mod descriptor;
mod traits;
mod value;

pub use descriptor::QueryDescriptor;
pub use traits::{SourceConnection, TargetWriter};
pub use value::{RowBatch, Value};
