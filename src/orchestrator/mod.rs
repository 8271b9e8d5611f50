//! Batch orchestrator: one source connection, descriptors in order.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::core::{QueryDescriptor, SourceConnection, TargetWriter};
use crate::error::{EtlError, Result};
use crate::source;
use crate::transfer::{transfer, TransferOutcome, TransferStatus};

/// Run every descriptor in order against one freshly acquired source
/// connection and the caller-supplied target.
///
/// Fatal conditions (empty descriptor list, unknown platform, source
/// connection failure) abort before any descriptor executes. Per-descriptor
/// failures are recorded in the outcome sequence and never interrupt the
/// remaining descriptors, so the caller always receives one outcome per
/// descriptor. The source connection is released exactly once whenever it
/// was acquired; the target is never opened or closed here.
pub async fn run(
    descriptors: &[QueryDescriptor],
    target: &mut dyn TargetWriter,
    platform: &str,
    source_config: &SourceConfig,
) -> Result<Vec<TransferOutcome>> {
    if descriptors.is_empty() {
        return Err(EtlError::Config("descriptor list is empty".to_string()));
    }

    let source = source::connect(platform, source_config).await?;
    Ok(run_with_source(source, target, descriptors).await)
}

/// The per-descriptor loop plus source teardown, given an already-open
/// source connection. Takes ownership of the source and always releases it.
pub async fn run_with_source(
    mut source: Box<dyn SourceConnection>,
    target: &mut dyn TargetWriter,
    descriptors: &[QueryDescriptor],
) -> Vec<TransferOutcome> {
    info!(
        "Starting run: {} descriptors against {} source",
        descriptors.len(),
        source.platform()
    );

    let mut outcomes = Vec::with_capacity(descriptors.len());
    for (idx, descriptor) in descriptors.iter().enumerate() {
        let outcome = transfer(source.as_mut(), target, descriptor).await;
        match &outcome.status {
            TransferStatus::Success => {
                info!("Descriptor {}: loaded {} rows", idx, outcome.row_count)
            }
            TransferStatus::EmptyResult => info!("Descriptor {}: no data found", idx),
            TransferStatus::Failure(reason) => warn!("Descriptor {}: {}", idx, reason),
        }
        outcomes.push(outcome);
    }

    if let Err(e) = source.close().await {
        warn!("Failed to close source connection: {}", e);
    }

    outcomes
}

/// Summary of one run, for an external reporting collaborator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Descriptors processed.
    pub total: usize,

    /// Descriptors that loaded at least one row.
    pub succeeded: usize,

    /// Descriptors whose extract produced no rows.
    pub empty: usize,

    /// Descriptors that failed.
    pub failed: usize,

    /// Total rows written across all descriptors.
    pub rows_transferred: u64,

    /// Failure reasons, in descriptor order.
    pub failures: Vec<String>,
}

impl RunReport {
    /// Summarize a completed run.
    pub fn from_outcomes(outcomes: &[TransferOutcome]) -> Self {
        let mut report = RunReport {
            total: outcomes.len(),
            ..RunReport::default()
        };

        for outcome in outcomes {
            report.rows_transferred += outcome.row_count;
            match &outcome.status {
                TransferStatus::Success => report.succeeded += 1,
                TransferStatus::EmptyResult => report.empty += 1,
                TransferStatus::Failure(reason) => {
                    report.failed += 1;
                    report.failures.push(reason.clone());
                }
            }
        }

        report
    }
}
