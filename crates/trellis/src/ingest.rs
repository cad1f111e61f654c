//! Analysis report ingestion.
//!
//! Instrumentation emits one report per product version: a forest of
//! invocations, each node carrying its signature and the invocations made
//! from it.
//!
//! ```json
//! {"product":"Shop","version":"1.0","rootInvocations":[
//!   {"kind":"Public","signature":"Cart.Add()","invocations":[
//!     {"kind":"Private","signature":"Stock.Reserve()","invocations":[]}]}]}
//! ```
//!
//! [`flatten_report`] turns that tree into ledger entries: one per signature,
//! listing its direct callees.

use crate::catalog::memory::MemoryStore;
use crate::domain::InvocationRecord;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Invocation tree recorded for one product version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Product analyzed
    pub product: String,
    /// Version analyzed
    pub version: String,
    /// Entry-point invocations
    #[serde(default)]
    pub root_invocations: Vec<Invocation>,
}

/// One node of the invocation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Signature of the invoked code unit
    pub signature: String,
    /// Invocations made from this code unit
    #[serde(default)]
    pub invocations: Vec<Invocation>,
}

/// Outcome of [`ingest_report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Product of the report
    pub product: String,
    /// Version of the report
    pub version: String,
    /// Ledger entries recorded
    pub entries: usize,
}

/// Flatten the invocation tree of `report` into ledger entries.
///
/// Signatures appear in pre-order of first occurrence. A signature found in
/// several places gets the union of its callees, in first-seen order and
/// without duplicates. Calls of a signature to itself are dropped, and
/// signatures without callees produce no entry.
#[must_use]
pub fn flatten_report(report: &AnalysisReport) -> Vec<InvocationRecord> {
    let mut order: Vec<&str> = Vec::new();
    let mut callees: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut stack: Vec<&Invocation> = report.root_invocations.iter().rev().collect();

    while let Some(invocation) = stack.pop() {
        let caller = invocation.signature.as_str();
        let entry = callees.entry(caller).or_insert_with(|| {
            order.push(caller);
            Vec::new()
        });
        for child in &invocation.invocations {
            let callee = child.signature.as_str();
            if callee != caller && !entry.contains(&callee) {
                entry.push(callee);
            }
        }
        stack.extend(invocation.invocations.iter().rev());
    }

    order
        .into_iter()
        .filter_map(|signature| {
            let invoked = callees.remove(signature)?;
            if invoked.is_empty() {
                return None;
            }
            Some(InvocationRecord {
                product: report.product.clone(),
                version: report.version.clone(),
                signature: signature.to_string(),
                invoked_signatures: invoked.into_iter().map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Read an analysis report from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid report.
pub async fn load_report(path: &Path) -> Result<AnalysisReport> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Record every ledger entry of `report` into `store`.
///
/// Entries merge with what the store already holds for the same signature.
/// A report is recorded whole or not at all.
///
/// # Errors
///
/// Returns [`StorageError::InvalidRecord`](crate::error::StorageError) if
/// the report's product or version is blank, or any signature is.
pub async fn ingest_report(store: &MemoryStore, report: &AnalysisReport) -> Result<IngestSummary> {
    let records = flatten_report(report);
    let entries = records.len();
    store.record_all(records).await?;

    tracing::info!(
        product = %report.product,
        version = %report.version,
        entries,
        "Ingested analysis report"
    );
    Ok(IngestSummary {
        product: report.product.clone(),
        version: report.version.clone(),
        entries,
    })
}
