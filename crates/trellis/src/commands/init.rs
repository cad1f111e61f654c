//! Implementation of the `init` command and the repository configuration.
//!
//! A trellis repository is a directory containing `.trellis/`, which holds
//! `config.yaml` and the two JSONL data files.

use crate::error::{ConfigError, Result};
use crate::graph::ConflictPolicy;
use crate::service::{GraphSettings, RootScope};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the trellis directory
pub const TRELLIS_DIR_NAME: &str = ".trellis";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the feature catalog file
pub const FEATURES_FILE_NAME: &str = "features.jsonl";

/// Name of the invocation ledger file
pub const INVOCATIONS_FILE_NAME: &str = "invocations.jsonl";

/// Name of the gitignore file within .trellis
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum directory depth to traverse when searching for the trellis root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Contents of `.trellis/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TrellisConfig {
    /// Feature catalog file, relative to the repository root
    pub features_file: String,

    /// Invocation ledger file, relative to the repository root
    pub invocations_file: String,

    /// Scope of `trellis roots` when no filter is given
    #[serde(default)]
    pub roots: RootScope,

    /// Handling of signatures declared by more than one feature
    #[serde(default)]
    pub signature_conflicts: ConflictPolicy,
}

impl TrellisConfig {
    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_yaml::from_str(&content).map_err(ConfigError::from)?)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Absolute path of the feature file for a repository rooted at `root`.
    #[must_use]
    pub fn features_path(&self, root: &Path) -> PathBuf {
        root.join(&self.features_file)
    }

    /// Absolute path of the invocation file for a repository rooted at
    /// `root`.
    #[must_use]
    pub fn invocations_path(&self, root: &Path) -> PathBuf {
        root.join(&self.invocations_file)
    }

    /// Query settings derived from this configuration.
    #[must_use]
    pub fn graph_settings(&self) -> GraphSettings {
        GraphSettings {
            root_scope: self.roots.clone(),
            conflict_policy: self.signature_conflicts,
        }
    }
}

impl Default for TrellisConfig {
    fn default() -> Self {
        Self {
            features_file: format!("{TRELLIS_DIR_NAME}/{FEATURES_FILE_NAME}"),
            invocations_file: format!("{TRELLIS_DIR_NAME}/{INVOCATIONS_FILE_NAME}"),
            roots: RootScope::All,
            signature_conflicts: ConflictPolicy::FirstWins,
        }
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created trellis directory
    pub trellis_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created feature file
    pub features_file: PathBuf,
    /// Path to the created invocation file
    pub invocations_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
}

/// Initialize a new trellis repository in `base_dir`.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyInitialized`] if `.trellis/` already
/// exists, or an IO error if a file cannot be created.
pub async fn init(base_dir: &Path) -> Result<InitResult> {
    let trellis_dir = base_dir.join(TRELLIS_DIR_NAME);

    if fs::try_exists(&trellis_dir).await? {
        return Err(ConfigError::AlreadyInitialized(trellis_dir).into());
    }

    fs::create_dir_all(&trellis_dir).await?;

    let config_file = trellis_dir.join(CONFIG_FILE_NAME);
    TrellisConfig::default().save(&config_file).await?;

    let features_file = trellis_dir.join(FEATURES_FILE_NAME);
    fs::write(&features_file, "").await?;

    let invocations_file = trellis_dir.join(INVOCATIONS_FILE_NAME);
    fs::write(&invocations_file, "").await?;

    let gitignore_file = trellis_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Trellis temp files left behind by interrupted writes
# The features and invocations files should be tracked
*.tmp
";
    fs::write(&gitignore_file, gitignore_content).await?;

    tracing::debug!(dir = %trellis_dir.display(), "Initialized trellis repository");

    Ok(InitResult {
        trellis_dir,
        config_file,
        features_file,
        invocations_file,
        gitignore_file,
    })
}

/// Check if a directory has been initialized with trellis.
#[must_use]
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TRELLIS_DIR_NAME).exists()
}

/// Find the trellis root directory by searching up the directory tree.
///
/// Returns the directory containing `.trellis/`, or `None` if none is found
/// before the filesystem root or [`MAX_TRAVERSAL_DEPTH`] parents.
#[must_use]
pub fn find_trellis_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TRELLIS_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
