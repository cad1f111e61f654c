//! Read contracts for the feature catalog and the invocation ledger.
//!
//! The dependency graph is computed from two sources that are owned
//! elsewhere: the catalog of published features and the ledger of recorded
//! invocations. Both are async traits so that backends are free to perform
//! I/O. Graph construction itself never calls them; the query façade fetches
//! everything it needs up front (see [`crate::service`]).
//!
//! [`memory::MemoryStore`] implements both traits and is what the CLI uses,
//! loaded from and saved to JSONL files.
//!
//! # Example
//!
//! ```
//! use trellis::catalog::{FeatureCatalog, InvocationLedger, memory::MemoryStore};
//! use trellis::domain::{Feature, FeatureId};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> trellis::error::Result<()> {
//!     let store = MemoryStore::new();
//!     store
//!         .upsert_feature(Feature::new(FeatureId::new("Shop", "Cart", "Add item", "1.0"), ["Cart.Add()"]))
//!         .await?;
//!     store
//!         .record_invocations("Shop", "1.0", "Cart.Add()", ["Stock.Reserve()"])
//!         .await?;
//!
//!     let features = store.list_features(Some("Shop"), None).await?;
//!     let ledger = store.get_invocations("Shop", "1.0").await?;
//!     assert_eq!(features.len(), 1);
//!     assert_eq!(ledger["Cart.Add()"], vec!["Stock.Reserve()"]);
//!     Ok(())
//! }
//! ```

use crate::domain::{Feature, InvocationMap};
use crate::error::Result;
use async_trait::async_trait;

pub mod memory;

/// Source of published features.
#[async_trait]
pub trait FeatureCatalog: Send + Sync {
    /// List features, optionally narrowed to a product and/or version.
    ///
    /// The returned order is the catalog's iteration order. It must be stable
    /// between calls, because root and dependent orderings derive from it.
    async fn list_features(
        &self,
        product: Option<&str>,
        version: Option<&str>,
    ) -> Result<Vec<Feature>>;
}

/// Source of recorded signature invocations.
#[async_trait]
pub trait InvocationLedger: Send + Sync {
    /// All invocations recorded for `product` at `version`.
    ///
    /// An unknown product or version yields an empty map, not an error.
    async fn get_invocations(&self, product: &str, version: &str) -> Result<InvocationMap>;
}
