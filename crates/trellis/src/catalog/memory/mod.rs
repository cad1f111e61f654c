//! In-memory feature catalog and invocation ledger.
//!
//! [`MemoryStore`] holds every feature and every recorded invocation in RAM.
//! It implements both [`FeatureCatalog`](crate::catalog::FeatureCatalog) and
//! [`InvocationLedger`](crate::catalog::InvocationLedger), so one store can
//! back a [`DependencyService`](crate::service::DependencyService) on its own.
//!
//! # Persistence
//!
//! [`load_from_jsonl`] and [`save_to_jsonl`] move the store to and from two
//! JSONL files, one for features and one for invocations.
//!
//! # Ordering
//!
//! Features keep their first-insertion order. Replacing a feature with
//! [`MemoryStore::upsert_feature`] keeps its original position, so the
//! catalog order (and therefore root and dependent ordering) is stable
//! across edits.
//!
//! # Thread Safety
//!
//! The store is a cheap handle around `Arc<RwLock<_>>`; clones share state.

mod inner;
mod jsonl;
mod trait_impl;

use crate::domain::{Feature, InvocationRecord, Scope};
use crate::error::{Result, StorageError};
use inner::MemoryStoreInner;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use jsonl::{DataFile, LoadWarning, load_from_jsonl, save_to_jsonl};

/// Shared in-memory store of features and invocations.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a feature, or replace the feature with the same identity.
    ///
    /// Returns `true` if an existing feature was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRecord`] if the feature fails
    /// validation.
    pub async fn upsert_feature(&self, feature: Feature) -> Result<bool> {
        feature.validate().map_err(StorageError::InvalidRecord)?;
        Ok(self.inner.write().await.upsert_feature(feature))
    }

    /// Record that `signature` invokes each of `invoked` within a product
    /// version.
    ///
    /// Invocations merge: signatures already recorded for `signature` are
    /// kept in place and unseen ones are appended in order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRecord`] if product, version or
    /// signature is blank.
    pub async fn record_invocations<I, S>(
        &self,
        product: &str,
        version: &str,
        signature: &str,
        invoked: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record = InvocationRecord {
            product: product.to_string(),
            version: version.to_string(),
            signature: signature.to_string(),
            invoked_signatures: invoked.into_iter().map(Into::into).collect(),
        };
        self.record(record).await
    }

    /// Record a ledger entry. See [`MemoryStore::record_invocations`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRecord`] if the record fails validation.
    pub async fn record(&self, record: InvocationRecord) -> Result<()> {
        record.validate().map_err(StorageError::InvalidRecord)?;
        self.inner.write().await.record(record);
        Ok(())
    }

    /// Record a batch of ledger entries, all or nothing.
    ///
    /// Every record is validated before any is written, and the batch is
    /// applied under a single write lock.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRecord`] for the first record that
    /// fails validation; the store is then left unchanged.
    pub async fn record_all(&self, records: Vec<InvocationRecord>) -> Result<()> {
        for record in &records {
            record.validate().map_err(StorageError::InvalidRecord)?;
        }
        let mut inner = self.inner.write().await;
        for record in records {
            inner.record(record);
        }
        Ok(())
    }

    /// Number of features in the catalog.
    pub async fn feature_count(&self) -> usize {
        self.inner.read().await.features.len()
    }

    /// Number of signatures with recorded invocations, across all scopes.
    pub async fn invocation_count(&self) -> usize {
        self.inner
            .read()
            .await
            .invocations
            .values()
            .map(std::collections::HashMap::len)
            .sum()
    }

    /// Distinct (product, version) pairs of the catalog, in first-seen order.
    pub async fn scopes(&self) -> Vec<Scope> {
        let inner = self.inner.read().await;
        let mut scopes: Vec<Scope> = Vec::new();
        for feature in &inner.features {
            let scope = feature.id.scope();
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        scopes
    }

    /// Snapshot of all features in catalog order.
    pub async fn export_features(&self) -> Vec<Feature> {
        self.inner.read().await.features.clone()
    }

    /// Snapshot of all ledger entries, sorted by product, version and
    /// signature.
    pub async fn export_invocations(&self) -> Vec<InvocationRecord> {
        self.inner.read().await.invocation_records()
    }
}
