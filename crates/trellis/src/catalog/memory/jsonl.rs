//! JSONL persistence for [`MemoryStore`].
//!
//! Two files back a store: the feature file holds one [`Feature`] per line
//! in catalog order, the invocation file one [`InvocationRecord`] per line.

use super::MemoryStore;
use crate::domain::{Feature, FeatureId, InvocationRecord};
use crate::error::{Result, StorageError};
use std::fmt;
use std::path::Path;
use trellis_jsonl::{Warning as JsonlWarning, read_jsonl_resilient, write_jsonl_atomic};

/// Which of the two data files a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    /// The feature catalog file
    Features,
    /// The invocation ledger file
    Invocations,
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Features => write!(f, "features"),
            Self::Invocations => write!(f, "invocations"),
        }
    }
}

/// Non-fatal problems found while loading a store.
///
/// Loading continues past every one of these; the affected record is
/// skipped (or, for duplicates, superseded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line could not be decoded and was skipped.
    MalformedLine {
        /// File containing the line
        file: DataFile,
        /// 1-based line number
        line_number: usize,
        /// Decoder message
        error: String,
    },

    /// A decoded record failed validation and was skipped.
    ///
    /// `record_number` counts successfully decoded records (1-based), not
    /// file lines.
    InvalidRecord {
        /// File containing the record
        file: DataFile,
        /// 1-based index among decoded records
        record_number: usize,
        /// Validation message
        error: String,
    },

    /// The same feature identity appeared more than once; the later record
    /// replaced the earlier one.
    DuplicateFeature {
        /// The repeated identity
        feature: FeatureId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine {
                file,
                line_number,
                error,
            } => write!(f, "{file} file, line {line_number}: {error}"),
            Self::InvalidRecord {
                file,
                record_number,
                error,
            } => write!(f, "{file} file, record {record_number}: {error}"),
            Self::DuplicateFeature { feature } => {
                write!(f, "duplicate feature {feature}; later record kept")
            }
        }
    }
}

/// Load a store from a feature file and an invocation file.
///
/// A missing file loads as empty, so a freshly initialized repository needs
/// no data yet.
///
/// # Errors
///
/// Returns an error only if a file exists but cannot be read. Bad records
/// become [`LoadWarning`]s.
pub async fn load_from_jsonl(
    features_path: &Path,
    invocations_path: &Path,
) -> Result<(MemoryStore, Vec<LoadWarning>)> {
    let store = MemoryStore::new();
    let mut warnings = Vec::new();

    let (features, jsonl_warnings) = read_or_empty::<Feature>(features_path).await?;
    collect_jsonl_warnings(DataFile::Features, jsonl_warnings, &mut warnings);
    let (records, jsonl_warnings) = read_or_empty::<InvocationRecord>(invocations_path).await?;
    collect_jsonl_warnings(DataFile::Invocations, jsonl_warnings, &mut warnings);

    {
        let mut inner = store.inner.write().await;
        for (index, feature) in features.into_iter().enumerate() {
            if let Err(error) = feature.validate() {
                warnings.push(LoadWarning::InvalidRecord {
                    file: DataFile::Features,
                    record_number: index + 1,
                    error,
                });
                continue;
            }
            let id = feature.id.clone();
            if inner.upsert_feature(feature) {
                warnings.push(LoadWarning::DuplicateFeature { feature: id });
            }
        }

        for (index, record) in records.into_iter().enumerate() {
            if let Err(error) = record.validate() {
                warnings.push(LoadWarning::InvalidRecord {
                    file: DataFile::Invocations,
                    record_number: index + 1,
                    error,
                });
                continue;
            }
            inner.record(record);
        }

        tracing::debug!(
            features = inner.features.len(),
            scopes = inner.invocations.len(),
            warnings = warnings.len(),
            "Loaded store from JSONL"
        );
    }

    for warning in &warnings {
        tracing::warn!(%warning, "Skipped data while loading");
    }

    Ok((store, warnings))
}

/// Save a store to its two JSONL files, each written atomically.
///
/// Features are written in catalog order; invocations sorted by product,
/// version and signature.
///
/// # Errors
///
/// Returns an error if either file cannot be written.
pub async fn save_to_jsonl(
    store: &MemoryStore,
    features_path: &Path,
    invocations_path: &Path,
) -> Result<()> {
    let features = store.export_features().await;
    let invocations = store.export_invocations().await;

    write_jsonl_atomic(features_path, &features)
        .await
        .map_err(StorageError::from)?;
    write_jsonl_atomic(invocations_path, &invocations)
        .await
        .map_err(StorageError::from)?;

    tracing::debug!(
        features = features.len(),
        invocations = invocations.len(),
        "Saved store to JSONL"
    );
    Ok(())
}

async fn read_or_empty<T>(path: &Path) -> Result<(Vec<T>, Vec<JsonlWarning>)>
where
    T: serde::de::DeserializeOwned,
{
    match read_jsonl_resilient::<T, _>(path).await {
        Ok(result) => Ok(result),
        Err(trellis_jsonl::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Data file missing, treating as empty");
            Ok((Vec::new(), Vec::new()))
        }
        Err(e) => Err(StorageError::from(e).into()),
    }
}

fn collect_jsonl_warnings(
    file: DataFile,
    jsonl_warnings: Vec<JsonlWarning>,
    warnings: &mut Vec<LoadWarning>,
) {
    for warning in jsonl_warnings {
        let line_number = warning.line_number();
        let error = match warning {
            JsonlWarning::MalformedJson { error, .. } => error,
            JsonlWarning::SkippedLine { reason, .. } => reason,
        };
        warnings.push(LoadWarning::MalformedLine {
            file,
            line_number,
            error,
        });
    }
}
