//! Query façade over a feature catalog and an invocation ledger.
//!
//! [`DependencyService`] answers every graph query in two phases. It first
//! fetches the catalog slice and the ledgers of every product version the
//! query touches, then builds the result synchronously from that snapshot.
//! No store is consulted during expansion, and each query owns its own
//! arena.

use crate::catalog::memory::MemoryStore;
use crate::catalog::{FeatureCatalog, InvocationLedger};
use crate::domain::{Feature, InvocationMap, Scope};
use crate::error::{Error, Result};
use crate::graph::{
    ConflictPolicy, FeatureCycle, FeatureForest, FeatureGraph, ScopeGraph, SignatureConflict,
    find_cycles, top_level_graphs,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which features "all roots" ranges over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "kebab-case")]
pub enum RootScope {
    /// Every product and version in the catalog
    #[default]
    All,
    /// Every version of one product
    Product {
        /// Product name
        product: String,
    },
    /// One product version
    Release {
        /// Product name
        product: String,
        /// Product version
        version: String,
    },
}

impl RootScope {
    /// Narrow to `product`, and to `version` if given.
    ///
    /// `None` for both yields [`RootScope::All`]; a version without a
    /// product is ignored.
    #[must_use]
    pub fn from_filters(product: Option<String>, version: Option<String>) -> Self {
        match (product, version) {
            (Some(product), Some(version)) => Self::Release { product, version },
            (Some(product), None) => Self::Product { product },
            (None, _) => Self::All,
        }
    }

    fn filters(&self) -> (Option<&str>, Option<&str>) {
        match self {
            Self::All => (None, None),
            Self::Product { product } => (Some(product), None),
            Self::Release { product, version } => (Some(product), Some(version)),
        }
    }
}

impl fmt::Display for RootScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all products"),
            Self::Product { product } => write!(f, "{product}"),
            Self::Release { product, version } => write!(f, "{product}@{version}"),
        }
    }
}

/// Settings that shape graph queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSettings {
    /// Scope of [`DependencyService::top_level_feature_graphs`]
    pub root_scope: RootScope,
    /// Handling of signatures declared by more than one feature
    pub conflict_policy: ConflictPolicy,
}

/// Catalog slice plus the ledger of every scope present in it.
struct Snapshot {
    catalog: Vec<Feature>,
    ledgers: Vec<(Scope, InvocationMap)>,
}

impl Snapshot {
    fn graphs(&self, policy: ConflictPolicy) -> Result<Vec<ScopeGraph<'_>>> {
        self.ledgers
            .iter()
            .map(|(scope, invocations)| ScopeGraph::new(&self.catalog, scope, invocations, policy))
            .collect()
    }
}

/// Feature dependency queries over a catalog and a ledger.
#[derive(Clone)]
pub struct DependencyService {
    catalog: Arc<dyn FeatureCatalog>,
    ledger: Arc<dyn InvocationLedger>,
    settings: GraphSettings,
}

impl fmt::Debug for DependencyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl DependencyService {
    /// Create a service over separate catalog and ledger backends.
    pub fn new(
        catalog: Arc<dyn FeatureCatalog>,
        ledger: Arc<dyn InvocationLedger>,
        settings: GraphSettings,
    ) -> Self {
        Self {
            catalog,
            ledger,
            settings,
        }
    }

    /// Create a service backed by one [`MemoryStore`] for both roles.
    #[must_use]
    pub fn from_store(store: MemoryStore, settings: GraphSettings) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, settings)
    }

    /// The settings queries run with.
    #[must_use]
    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Graphs of every root feature in the configured root scope.
    ///
    /// # Errors
    ///
    /// Propagates store failures, and [`Error::AmbiguousSignatureOwner`]
    /// under [`ConflictPolicy::Reject`].
    pub async fn top_level_feature_graphs(&self) -> Result<FeatureForest> {
        self.top_level_feature_graphs_in(&self.settings.root_scope)
            .await
    }

    /// Graphs of every root feature in `scope`, in catalog order.
    ///
    /// Roots are determined per product version: a feature is a root if no
    /// feature of its own product version depends on it.
    ///
    /// # Errors
    ///
    /// Propagates store failures, and [`Error::AmbiguousSignatureOwner`]
    /// under [`ConflictPolicy::Reject`].
    pub async fn top_level_feature_graphs_in(&self, scope: &RootScope) -> Result<FeatureForest> {
        let snapshot = self.snapshot(scope).await?;
        let graphs = snapshot.graphs(self.settings.conflict_policy)?;
        let forest = top_level_graphs(&graphs);
        tracing::debug!(scope = %scope, roots = forest.len(), "Computed top-level graphs");
        Ok(forest)
    }

    /// The graph around the feature titled `feature_name` in `product` at
    /// `version`, expanded in both directions.
    ///
    /// If several groups use the title, the first in catalog order is taken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FeatureNotFound`] if no such feature exists, and
    /// propagates store failures.
    pub async fn feature_graph(
        &self,
        product: &str,
        feature_name: &str,
        version: &str,
    ) -> Result<FeatureGraph> {
        self.with_feature(product, feature_name, version, |graph, feature| {
            graph.feature_graph(&feature.id)
        })
        .await
    }

    /// Features that the named feature directly depends on.
    ///
    /// # Errors
    ///
    /// Same as [`DependencyService::feature_graph`].
    pub async fn direct_dependencies(
        &self,
        product: &str,
        feature_name: &str,
        version: &str,
    ) -> Result<Vec<Feature>> {
        self.with_feature(product, feature_name, version, |graph, feature| {
            Ok(graph
                .direct_dependencies(&feature.id)?
                .into_iter()
                .cloned()
                .collect())
        })
        .await
    }

    /// Features that directly depend on the named feature.
    ///
    /// # Errors
    ///
    /// Same as [`DependencyService::feature_graph`].
    pub async fn direct_dependents(
        &self,
        product: &str,
        feature_name: &str,
        version: &str,
    ) -> Result<Vec<Feature>> {
        self.with_feature(product, feature_name, version, |graph, feature| {
            Ok(graph
                .direct_dependents(&feature.id)?
                .into_iter()
                .cloned()
                .collect())
        })
        .await
    }

    /// Groups of mutually dependent features in `scope`.
    ///
    /// # Errors
    ///
    /// Propagates store failures, and [`Error::AmbiguousSignatureOwner`]
    /// under [`ConflictPolicy::Reject`].
    pub async fn cycles(&self, scope: &RootScope) -> Result<Vec<FeatureCycle>> {
        let snapshot = self.snapshot(scope).await?;
        let graphs = snapshot.graphs(self.settings.conflict_policy)?;
        Ok(graphs.iter().flat_map(find_cycles).collect())
    }

    /// Signatures declared by more than one feature in `scope`.
    ///
    /// Always resolves with [`ConflictPolicy::FirstWins`] so that every
    /// conflict is listed.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn signature_conflicts(&self, scope: &RootScope) -> Result<Vec<SignatureConflict>> {
        let snapshot = self.snapshot(scope).await?;
        let graphs = snapshot.graphs(ConflictPolicy::FirstWins)?;
        Ok(graphs
            .iter()
            .flat_map(|g| g.conflicts().iter().cloned())
            .collect())
    }

    async fn with_feature<T>(
        &self,
        product: &str,
        feature_name: &str,
        version: &str,
        query: impl FnOnce(&ScopeGraph<'_>, &Feature) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self
            .snapshot(&RootScope::Release {
                product: product.to_string(),
                version: version.to_string(),
            })
            .await?;
        let not_found = || Error::FeatureNotFound {
            product: product.to_string(),
            title: feature_name.to_string(),
            version: version.to_string(),
        };

        let (scope, invocations) = snapshot.ledgers.first().ok_or_else(not_found)?;
        let graph = ScopeGraph::new(
            &snapshot.catalog,
            scope,
            invocations,
            self.settings.conflict_policy,
        )?;
        let feature = graph.find_by_title(feature_name).ok_or_else(not_found)?;
        query(&graph, feature)
    }

    /// Fetch the catalog slice for `scope` and the ledger of each product
    /// version in it.
    async fn snapshot(&self, scope: &RootScope) -> Result<Snapshot> {
        let (product, version) = scope.filters();
        let catalog = self.catalog.list_features(product, version).await?;

        let mut scopes: Vec<Scope> = Vec::new();
        for feature in &catalog {
            let scope = feature.id.scope();
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }

        let mut ledgers = Vec::with_capacity(scopes.len());
        for scope in scopes {
            let invocations = self
                .ledger
                .get_invocations(&scope.product, &scope.version)
                .await?;
            ledgers.push((scope, invocations));
        }

        tracing::debug!(
            scope = %scope,
            features = catalog.len(),
            releases = ledgers.len(),
            "Fetched catalog snapshot"
        );
        Ok(Snapshot { catalog, ledgers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureId;
    use rstest::rstest;

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        for (product, title, version, signature) in [
            ("Shop", "Checkout", "1", "Checkout()"),
            ("Shop", "Payment", "1", "Pay()"),
            ("Shop", "Checkout", "2", "Checkout()"),
            ("Blog", "Post", "1", "Post()"),
        ] {
            store
                .upsert_feature(Feature::new(
                    FeatureId::new(product, "", title, version),
                    [signature],
                ))
                .await
                .unwrap();
        }
        store
            .record_invocations("Shop", "1", "Checkout()", ["Pay()"])
            .await
            .unwrap();
        store
    }

    #[rstest]
    #[case::all(RootScope::All, vec!["Checkout", "Checkout", "Post"])]
    #[case::product(RootScope::Product { product: "Shop".into() }, vec!["Checkout", "Checkout"])]
    #[case::release(
        RootScope::Release { product: "Shop".into(), version: "1".into() },
        vec!["Checkout"]
    )]
    #[tokio::test]
    async fn roots_respect_scope(#[case] scope: RootScope, #[case] expected: Vec<&str>) {
        let service = DependencyService::from_store(store().await, GraphSettings::default());

        let forest = service.top_level_feature_graphs_in(&scope).await.unwrap();

        let titles: Vec<&str> = forest.roots().map(|r| r.feature().title.as_str()).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn configured_scope_is_the_default() {
        let settings = GraphSettings {
            root_scope: RootScope::Product {
                product: "Blog".into(),
            },
            ..GraphSettings::default()
        };
        let service = DependencyService::from_store(store().await, settings);

        let forest = service.top_level_feature_graphs().await.unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest.roots().next().unwrap().feature().title, "Post");
    }

    #[tokio::test]
    async fn feature_graph_reports_missing_feature() {
        let service = DependencyService::from_store(store().await, GraphSettings::default());

        let result = service.feature_graph("Shop", "Refund", "1").await;

        assert!(matches!(
            result,
            Err(Error::FeatureNotFound { ref title, .. }) if title == "Refund"
        ));
        let result = service.feature_graph("Shop", "Checkout", "9").await;
        assert!(matches!(result, Err(Error::FeatureNotFound { .. })));
    }

    #[tokio::test]
    async fn one_hop_queries() {
        let service = DependencyService::from_store(store().await, GraphSettings::default());

        let deps = service
            .direct_dependencies("Shop", "Checkout", "1")
            .await
            .unwrap();
        let dependents = service
            .direct_dependents("Shop", "Payment", "1")
            .await
            .unwrap();

        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].id.title, "Payment");
        assert_eq!(dependents[0].id.title, "Checkout");
    }

    #[test]
    fn root_scope_reads_config_shape() {
        let scope: RootScope =
            serde_yaml::from_str("scope: release\nproduct: Shop\nversion: '2'\n").unwrap();
        assert_eq!(
            scope,
            RootScope::Release {
                product: "Shop".into(),
                version: "2".into()
            }
        );
        let all: RootScope = serde_yaml::from_str("scope: all\n").unwrap();
        assert_eq!(all, RootScope::All);
    }

    #[test]
    fn from_filters_ignores_version_without_product() {
        assert_eq!(
            RootScope::from_filters(None, Some("1".into())),
            RootScope::All
        );
    }
}
