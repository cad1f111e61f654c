//! Catalog and ledger trait implementations for [`MemoryStore`].

use super::MemoryStore;
use crate::catalog::{FeatureCatalog, InvocationLedger};
use crate::domain::{Feature, InvocationMap, Scope};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
impl FeatureCatalog for MemoryStore {
    async fn list_features(
        &self,
        product: Option<&str>,
        version: Option<&str>,
    ) -> Result<Vec<Feature>> {
        let inner = self.inner.read().await;
        Ok(inner.features_matching(product, version))
    }
}

#[async_trait]
impl InvocationLedger for MemoryStore {
    async fn get_invocations(&self, product: &str, version: &str) -> Result<InvocationMap> {
        let inner = self.inner.read().await;
        Ok(inner
            .invocations
            .get(&Scope::new(product, version))
            .cloned()
            .unwrap_or_default())
    }
}
