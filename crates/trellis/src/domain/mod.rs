//! Domain types for features and recorded invocations.
//!
//! A [`Feature`] is a documented unit of behavior identified by
//! `(product, group, title, version)`. It links to code through its direct
//! invocation signatures. An [`InvocationRecord`] is one row of the
//! invocation ledger: a signature and the signatures it invokes, scoped to a
//! product and version.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Signature -> ordered list of invoked signatures, for one [`Scope`].
pub type InvocationMap = HashMap<String, Vec<String>>;

/// Identity of a feature.
///
/// Two features are the same feature iff all four fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId {
    /// Product the feature documents
    pub product: String,

    /// Group within the product
    #[serde(default)]
    pub group: String,

    /// Feature title, unique enough to address a feature within a scope
    pub title: String,

    /// Product version the feature was published for
    pub version: String,
}

impl FeatureId {
    /// Create a feature identity.
    pub fn new(
        product: impl Into<String>,
        group: impl Into<String>,
        title: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            group: group.into(),
            title: title.into(),
            version: version.into(),
        }
    }

    /// The (product, version) scope this feature belongs to.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::new(&self.product, &self.version)
    }

    /// Whether this feature lives in `product` at `version`.
    #[must_use]
    pub fn in_scope(&self, product: &str, version: &str) -> bool {
        self.product == product && self.version == version
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}@{}", self.product, self.title, self.version)
        } else {
            write!(
                f,
                "{}/{}/{}@{}",
                self.product, self.group, self.title, self.version
            )
        }
    }
}

/// A feature from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature identity
    #[serde(flatten)]
    pub id: FeatureId,

    /// Signatures of the code units that are this feature's entry points, in
    /// declaration order
    #[serde(default, alias = "directInvocationSignatures")]
    pub direct_invocation_signatures: Vec<String>,
}

impl Feature {
    /// Create a feature with the given identity and entry-point signatures.
    pub fn new<I, S>(id: FeatureId, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            direct_invocation_signatures: signatures.into_iter().map(Into::into).collect(),
        }
    }

    /// Validate a feature record.
    ///
    /// Product, title and version must be non-blank; the group may be empty.
    /// Declared signatures must be non-blank.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.product.trim().is_empty() {
            return Err("product cannot be empty".to_string());
        }
        if self.id.title.trim().is_empty() {
            return Err("title cannot be empty".to_string());
        }
        if self.id.version.trim().is_empty() {
            return Err("version cannot be empty".to_string());
        }
        if self
            .direct_invocation_signatures
            .iter()
            .any(|s| s.trim().is_empty())
        {
            return Err(format!("feature '{}' declares a blank signature", self.id));
        }
        Ok(())
    }
}

/// A product at a specific version: the unit over which invocations are
/// recorded and signatures are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    /// Product name
    pub product: String,
    /// Product version
    pub version: String,
}

impl Scope {
    /// Create a scope.
    pub fn new(product: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.product, self.version)
    }
}

/// One ledger entry: `signature` invokes `invoked_signatures`, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRecord {
    /// Product the invocation was recorded for
    pub product: String,

    /// Product version the invocation was recorded for
    pub version: String,

    /// Calling signature
    pub signature: String,

    /// Called signatures in recorded order
    #[serde(default, alias = "invokedSignatures")]
    pub invoked_signatures: Vec<String>,
}

impl InvocationRecord {
    /// Validate a ledger record.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if product, version, signature
    /// or any invoked signature is blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.product.trim().is_empty() {
            return Err("product cannot be empty".to_string());
        }
        if self.version.trim().is_empty() {
            return Err("version cannot be empty".to_string());
        }
        if self.signature.trim().is_empty() {
            return Err("signature cannot be empty".to_string());
        }
        if self.invoked_signatures.iter().any(|s| s.trim().is_empty()) {
            return Err(format!("'{}' invokes a blank signature", self.signature));
        }
        Ok(())
    }

    /// The (product, version) scope of this record.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope::new(&self.product, &self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_id_display_omits_empty_group() {
        let with_group = FeatureId::new("Shop", "Checkout", "Pay", "1.0");
        let without_group = FeatureId::new("Shop", "", "Pay", "1.0");

        assert_eq!(with_group.to_string(), "Shop/Checkout/Pay@1.0");
        assert_eq!(without_group.to_string(), "Shop/Pay@1.0");
    }

    #[test]
    fn feature_deserializes_flattened_identity_and_camel_case_alias() {
        let json = r#"{"product":"P","group":"G","title":"T","version":"1","directInvocationSignatures":["A()"]}"#;
        let feature: Feature = serde_json::from_str(json).unwrap();

        assert_eq!(feature.id, FeatureId::new("P", "G", "T", "1"));
        assert_eq!(feature.direct_invocation_signatures, vec!["A()"]);
    }

    #[test]
    fn feature_without_signatures_defaults_to_empty() {
        let json = r#"{"product":"P","title":"T","version":"1"}"#;
        let feature: Feature = serde_json::from_str(json).unwrap();

        assert!(feature.direct_invocation_signatures.is_empty());
        assert_eq!(feature.id.group, "");
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let blank_title = Feature::new(FeatureId::new("P", "G", " ", "1"), Vec::<String>::new());
        let blank_signature = Feature::new(FeatureId::new("P", "G", "T", "1"), [""]);

        assert!(blank_title.validate().unwrap_err().contains("title"));
        assert!(blank_signature.validate().unwrap_err().contains("blank signature"));
    }

    #[test]
    fn invocation_record_validation() {
        let record = InvocationRecord {
            product: "P".to_string(),
            version: "1".to_string(),
            signature: String::new(),
            invoked_signatures: vec![],
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn invocation_record_rejects_blank_callee() {
        let record = InvocationRecord {
            product: "P".to_string(),
            version: "1".to_string(),
            signature: "A()".to_string(),
            invoked_signatures: vec!["B()".to_string(), "  ".to_string()],
        };

        let message = record.validate().unwrap_err();

        assert!(message.contains("A()"), "got: {message}");
        assert!(message.contains("blank signature"), "got: {message}");
    }
}
