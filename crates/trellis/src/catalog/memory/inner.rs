//! Data structures behind [`MemoryStore`](super::MemoryStore).

use crate::domain::{Feature, FeatureId, InvocationMap, InvocationRecord, Scope};
use std::collections::HashMap;

/// Store contents (not thread-safe on their own).
#[derive(Debug, Default)]
pub(super) struct MemoryStoreInner {
    /// Features in catalog order
    pub(super) features: Vec<Feature>,

    /// Position of each feature in `features`
    pub(super) positions: HashMap<FeatureId, usize>,

    /// Ledger, partitioned by scope
    pub(super) invocations: HashMap<Scope, InvocationMap>,
}

impl MemoryStoreInner {
    /// Returns `true` if a feature with the same identity was replaced.
    pub(super) fn upsert_feature(&mut self, feature: Feature) -> bool {
        if let Some(&position) = self.positions.get(&feature.id) {
            self.features[position] = feature;
            return true;
        }
        self.positions
            .insert(feature.id.clone(), self.features.len());
        self.features.push(feature);
        false
    }

    pub(super) fn record(&mut self, record: InvocationRecord) {
        let scope = record.scope();
        let invoked = self
            .invocations
            .entry(scope)
            .or_default()
            .entry(record.signature)
            .or_default();
        for signature in record.invoked_signatures {
            if !invoked.contains(&signature) {
                invoked.push(signature);
            }
        }
    }

    pub(super) fn features_matching(
        &self,
        product: Option<&str>,
        version: Option<&str>,
    ) -> Vec<Feature> {
        self.features
            .iter()
            .filter(|f| product.is_none_or(|p| f.id.product == p))
            .filter(|f| version.is_none_or(|v| f.id.version == v))
            .cloned()
            .collect()
    }

    /// All ledger entries sorted by (product, version, signature), so saved
    /// files do not churn between runs.
    pub(super) fn invocation_records(&self) -> Vec<InvocationRecord> {
        let mut records: Vec<InvocationRecord> = self
            .invocations
            .iter()
            .flat_map(|(scope, map)| {
                map.iter().map(move |(signature, invoked)| InvocationRecord {
                    product: scope.product.clone(),
                    version: scope.version.clone(),
                    signature: signature.clone(),
                    invoked_signatures: invoked.clone(),
                })
            })
            .collect();
        records.sort_by(|a, b| {
            a.product
                .cmp(&b.product)
                .then_with(|| a.version.cmp(&b.version))
                .then_with(|| a.signature.cmp(&b.signature))
        });
        records
    }
}
