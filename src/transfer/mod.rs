//! Transfer executor: runs one descriptor, extract then load.

use tracing::{debug, warn};

use crate::core::{QueryDescriptor, SourceConnection, TargetWriter};
use crate::error::EtlError;

/// Outcome classification for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    /// Rows were extracted and all of them were loaded.
    Success,

    /// The extract produced no rows; the load statement was never executed.
    /// This is a no-op signal, not an error.
    EmptyResult,

    /// The extract or load step failed. Nothing is rolled back; the
    /// outcome's `row_count` holds the rows already written.
    Failure(String),
}

/// Result record for one descriptor's execution.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// The descriptor this outcome belongs to.
    pub descriptor: QueryDescriptor,

    /// Rows written to the warehouse.
    pub row_count: u64,

    /// Outcome classification.
    pub status: TransferStatus,
}

impl TransferOutcome {
    fn new(descriptor: &QueryDescriptor, row_count: u64, status: TransferStatus) -> Self {
        Self {
            descriptor: descriptor.clone(),
            row_count,
            status,
        }
    }

    /// Whether the descriptor completed with rows written.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, TransferStatus::Success)
    }

    /// Whether the descriptor failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.status, TransferStatus::Failure(_))
    }
}

/// Run one descriptor: materialize the extract result, then execute the load
/// statement once per row, binding column values positionally.
///
/// Errors are local to the descriptor and come back as a `Failure` outcome,
/// never as `Err`; the extract step is read-only, so a load failure leaves
/// nothing to roll back and nothing is retried. A placeholder/column arity
/// mismatch is rejected before the first load call.
pub async fn transfer(
    source: &mut dyn SourceConnection,
    target: &mut dyn TargetWriter,
    descriptor: &QueryDescriptor,
) -> TransferOutcome {
    let batch = match source.fetch_all(descriptor.extract()).await {
        Ok(batch) => batch,
        Err(e) => {
            warn!("Extract failed: {}", e);
            return TransferOutcome::new(descriptor, 0, TransferStatus::Failure(e.to_string()));
        }
    };

    if batch.is_empty() {
        debug!("No data found for extract statement; skipping load");
        return TransferOutcome::new(descriptor, 0, TransferStatus::EmptyResult);
    }

    let expected = descriptor.load_arity();
    if let Some(actual) = batch.rows.iter().map(Vec::len).find(|len| *len != expected) {
        let e = EtlError::SchemaMismatch { expected, actual };
        warn!("{}", e);
        return TransferOutcome::new(descriptor, 0, TransferStatus::Failure(e.to_string()));
    }

    let mut written = 0u64;
    for row in &batch.rows {
        match target.execute(descriptor.load(), row).await {
            Ok(_) => written += 1,
            Err(e) => {
                warn!("Load failed after {} rows: {}", written, e);
                return TransferOutcome::new(
                    descriptor,
                    written,
                    TransferStatus::Failure(e.to_string()),
                );
            }
        }
    }

    debug!("Loaded {} rows to warehouse", written);
    TransferOutcome::new(descriptor, written, TransferStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::testing::{MockSource, MockTarget};

    const EXTRACT: &str = "SELECT id, name FROM t";
    const LOAD: &str = "INSERT INTO t (id, name) VALUES ($1, $2)";

    fn descriptor() -> QueryDescriptor {
        QueryDescriptor::new(EXTRACT, LOAD).unwrap()
    }

    fn three_rows() -> Vec<Vec<Value>> {
        vec![
            vec![Value::I64(1), Value::from("a")],
            vec![Value::I64(2), Value::from("b")],
            vec![Value::I64(3), Value::from("c")],
        ]
    }

    #[tokio::test]
    async fn test_success_loads_every_row_in_order() {
        let mut source = MockSource::new().with_result(EXTRACT, three_rows());
        let mut target = MockTarget::new();

        let outcome = transfer(&mut source, &mut target, &descriptor()).await;

        assert_eq!(outcome.status, TransferStatus::Success);
        assert_eq!(outcome.row_count, 3);
        assert_eq!(target.executed.len(), 3);
        for (idx, (statement, row)) in target.executed.iter().enumerate() {
            assert_eq!(statement, LOAD);
            assert_eq!(row, &three_rows()[idx]);
        }
    }

    #[tokio::test]
    async fn test_empty_result_skips_load() {
        let mut source = MockSource::new().with_result(EXTRACT, Vec::new());
        let mut target = MockTarget::new();

        let outcome = transfer(&mut source, &mut target, &descriptor()).await;

        assert_eq!(outcome.status, TransferStatus::EmptyResult);
        assert_eq!(outcome.row_count, 0);
        assert!(target.executed.is_empty());
    }

    #[tokio::test]
    async fn test_extract_failure() {
        let mut source = MockSource::new().failing_on(EXTRACT);
        let mut target = MockTarget::new();

        let outcome = transfer(&mut source, &mut target, &descriptor()).await;

        assert!(outcome.is_failure());
        assert_eq!(outcome.row_count, 0);
        assert!(target.executed.is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_keeps_partial_count() {
        let mut source = MockSource::new().with_result(EXTRACT, three_rows());
        let mut target = MockTarget::new().failing_after(2);

        let outcome = transfer(&mut source, &mut target, &descriptor()).await;

        assert!(outcome.is_failure());
        assert_eq!(outcome.row_count, 2);
        assert_eq!(target.executed.len(), 2);
    }

    #[tokio::test]
    async fn test_arity_mismatch_rejected_before_any_load() {
        let rows = vec![vec![Value::I64(1)]];
        let mut source = MockSource::new().with_result(EXTRACT, rows);
        let mut target = MockTarget::new();

        let outcome = transfer(&mut source, &mut target, &descriptor()).await;

        match &outcome.status {
            TransferStatus::Failure(reason) => assert!(reason.contains("expects 2 parameters")),
            other => panic!("expected Failure, got {:?}", other),
        }
        assert!(target.executed.is_empty());
    }
}
