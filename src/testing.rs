//! Mock connections for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{RowBatch, SourceConnection, TargetWriter, Value};
use crate::error::{EtlError, Result};

/// Canned source: maps extract statements to fixed result sets.
pub struct MockSource {
    results: HashMap<String, Vec<Vec<Value>>>,
    fail_statements: Vec<String>,
    close_calls: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            fail_statements: Vec::new(),
            close_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_result(mut self, statement: &str, rows: Vec<Vec<Value>>) -> Self {
        self.results.insert(statement.to_string(), rows);
        self
    }

    pub fn failing_on(mut self, statement: &str) -> Self {
        self.fail_statements.push(statement.to_string());
        self
    }

    /// Counter shared with the mock, readable after the source is moved.
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.close_calls)
    }
}

#[async_trait]
impl SourceConnection for MockSource {
    async fn fetch_all(&mut self, statement: &str) -> Result<RowBatch> {
        if self.fail_statements.iter().any(|s| s == statement) {
            return Err(EtlError::extract("simulated extract failure"));
        }
        Ok(RowBatch::new(
            self.results.get(statement).cloned().unwrap_or_default(),
        ))
    }

    fn platform(&self) -> &str {
        "mock"
    }

    async fn close(&mut self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Recording target: captures every load invocation.
pub struct MockTarget {
    pub executed: Vec<(String, Vec<Value>)>,
    fail_after: Option<usize>,
}

impl MockTarget {
    pub fn new() -> Self {
        Self {
            executed: Vec::new(),
            fail_after: None,
        }
    }

    /// Fail every call after `calls` successful ones.
    pub fn failing_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }
}

#[async_trait]
impl TargetWriter for MockTarget {
    async fn execute(&mut self, statement: &str, row: &[Value]) -> Result<u64> {
        if let Some(limit) = self.fail_after {
            if self.executed.len() >= limit {
                return Err(EtlError::load("simulated load failure"));
            }
        }
        self.executed.push((statement.to_string(), row.to_vec()));
        Ok(1)
    }
}
