//! Signature -> owning feature resolution.
//!
//! Built fresh for every query from the features of one product version.
//! When two features declare the same signature, the feature that comes
//! first in catalog order owns it. Each such clash is kept as a
//! [`SignatureConflict`] so callers can report it; under
//! [`ConflictPolicy::Reject`] the first clash aborts the query instead.

use crate::domain::{Feature, FeatureId};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// What to do when two features declare the same signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// The feature registered first owns the signature
    #[default]
    FirstWins,
    /// Fail the query with [`Error::AmbiguousSignatureOwner`]
    Reject,
}

/// A signature declared by more than one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureConflict {
    /// The contested signature
    pub signature: String,
    /// The feature that owns it
    pub owner: FeatureId,
    /// The later feature whose declaration was ignored
    pub ignored: FeatureId,
}

/// Index from signature to the feature that declares it.
#[derive(Debug)]
pub struct SignatureIndex<'a> {
    features: Vec<&'a Feature>,
    owners: HashMap<&'a str, usize>,
    conflicts: Vec<SignatureConflict>,
}

impl<'a> SignatureIndex<'a> {
    /// Index the signatures of `features`, visited in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousSignatureOwner`] on the first clash when
    /// `policy` is [`ConflictPolicy::Reject`].
    pub fn build(features: Vec<&'a Feature>, policy: ConflictPolicy) -> Result<Self> {
        let mut owners: HashMap<&'a str, usize> = HashMap::new();
        let mut conflicts = Vec::new();
        let mut reported: HashSet<(&'a str, usize)> = HashSet::new();

        for (position, &feature) in features.iter().enumerate() {
            for signature in &feature.direct_invocation_signatures {
                let Some(&owner) = owners.get(signature.as_str()) else {
                    owners.insert(signature.as_str(), position);
                    continue;
                };
                if owner == position || reported.contains(&(signature.as_str(), position)) {
                    continue;
                }

                let owner_id = &features[owner].id;
                if policy == ConflictPolicy::Reject {
                    return Err(Error::AmbiguousSignatureOwner {
                        signature: signature.clone(),
                        first: owner_id.clone(),
                        second: feature.id.clone(),
                    });
                }
                tracing::warn!(
                    signature = %signature,
                    owner = %owner_id,
                    ignored = %feature.id,
                    "Signature declared by more than one feature; first declaration wins"
                );
                reported.insert((signature.as_str(), position));
                conflicts.push(SignatureConflict {
                    signature: signature.clone(),
                    owner: owner_id.clone(),
                    ignored: feature.id.clone(),
                });
            }
        }

        Ok(Self {
            features,
            owners,
            conflicts,
        })
    }

    /// The feature that declares `signature`, if any.
    #[must_use]
    pub fn resolve_owner(&self, signature: &str) -> Option<&'a Feature> {
        self.owner_position(signature).map(|i| self.features[i])
    }

    /// Position (in the indexed feature order) of the owner of `signature`.
    #[must_use]
    pub fn owner_position(&self, signature: &str) -> Option<usize> {
        self.owners.get(signature).copied()
    }

    /// Features in indexed order.
    #[must_use]
    pub fn features(&self) -> &[&'a Feature] {
        &self.features
    }

    /// Signatures declared by more than one feature.
    #[must_use]
    pub fn conflicts(&self) -> &[SignatureConflict] {
        &self.conflicts
    }

    /// Number of distinct indexed signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no signature is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(title: &str, signatures: &[&str]) -> Feature {
        Feature::new(
            FeatureId::new("P", "G", title, "1"),
            signatures.iter().copied(),
        )
    }

    #[test]
    fn resolves_declared_signatures() {
        let a = feature("A", &["A()", "A(int)"]);
        let b = feature("B", &["B()"]);
        let index = SignatureIndex::build(vec![&a, &b], ConflictPolicy::FirstWins).unwrap();

        assert_eq!(index.resolve_owner("A(int)").unwrap().id.title, "A");
        assert_eq!(index.resolve_owner("B()").unwrap().id.title, "B");
        assert_eq!(index.owner_position("B()"), Some(1));
        assert!(index.resolve_owner("C()").is_none());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn first_registered_feature_wins() {
        let a = feature("A", &["Shared()"]);
        let b = feature("B", &["Shared()"]);
        let index = SignatureIndex::build(vec![&a, &b], ConflictPolicy::FirstWins).unwrap();

        assert_eq!(index.resolve_owner("Shared()").unwrap().id.title, "A");
        assert_eq!(index.conflicts().len(), 1);
        assert_eq!(index.conflicts()[0].owner.title, "A");
        assert_eq!(index.conflicts()[0].ignored.title, "B");
    }

    #[test]
    fn repeated_signature_within_one_feature_is_not_a_conflict() {
        let a = feature("A", &["A()", "A()"]);
        let index = SignatureIndex::build(vec![&a], ConflictPolicy::Reject).unwrap();

        assert!(index.conflicts().is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn repeated_losing_signature_is_one_conflict() {
        let a = feature("A", &["S()"]);
        let b = feature("B", &["S()", "S()"]);
        let c = feature("C", &["S()"]);
        let index = SignatureIndex::build(vec![&a, &b, &c], ConflictPolicy::FirstWins).unwrap();

        let ignored: Vec<&str> = index
            .conflicts()
            .iter()
            .map(|c| c.ignored.title.as_str())
            .collect();
        assert_eq!(ignored, vec!["B", "C"]);
        assert_eq!(index.resolve_owner("S()").unwrap().id.title, "A");
    }

    #[test]
    fn reject_policy_fails_on_conflict() {
        let a = feature("A", &["Shared()"]);
        let b = feature("B", &["Shared()"]);
        let result = SignatureIndex::build(vec![&a, &b], ConflictPolicy::Reject);

        match result {
            Err(Error::AmbiguousSignatureOwner {
                signature,
                first,
                second,
            }) => {
                assert_eq!(signature, "Shared()");
                assert_eq!(first.title, "A");
                assert_eq!(second.title, "B");
            }
            other => panic!("expected ambiguity error, got {other:?}"),
        }
    }
}
