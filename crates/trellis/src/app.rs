//! Application context for CLI command execution.
//!
//! [`App`] locates the repository, loads its configuration and data files,
//! and wires a [`DependencyService`] over the loaded store.
//!
//! # Example
//!
//! ```no_run
//! use trellis::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let forest = app.service().top_level_feature_graphs().await?;
//!     println!("{} root features", forest.len());
//!     Ok(())
//! }
//! ```

use crate::catalog::memory::{LoadWarning, MemoryStore, load_from_jsonl, save_to_jsonl};
use crate::commands::init::{CONFIG_FILE_NAME, TRELLIS_DIR_NAME, TrellisConfig, find_trellis_root};
use crate::error::{ConfigError, Result};
use crate::service::DependencyService;
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    store: MemoryStore,
    service: DependencyService,
    config: TrellisConfig,
    root_dir: PathBuf,
    load_warnings: Vec<LoadWarning>,
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for `.trellis/`, loads the
    /// configuration, then loads both data files.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No trellis repository is found in the directory tree
    /// - Configuration cannot be loaded
    /// - A data file exists but cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_trellis_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        let config_path = root_dir.join(TRELLIS_DIR_NAME).join(CONFIG_FILE_NAME);
        let config = TrellisConfig::load(&config_path).await?;

        let (store, load_warnings) = load_from_jsonl(
            &config.features_path(&root_dir),
            &config.invocations_path(&root_dir),
        )
        .await?;
        let service = DependencyService::from_store(store.clone(), config.graph_settings());

        tracing::debug!(root = %root_dir.display(), "Opened trellis repository");

        Ok(Self {
            store,
            service,
            config,
            root_dir,
            load_warnings,
        })
    }

    /// The loaded store. Clones share state with the service.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Graph queries over the loaded store.
    pub fn service(&self) -> &DependencyService {
        &self.service
    }

    /// The repository configuration.
    pub fn config(&self) -> &TrellisConfig {
        &self.config
    }

    /// Directory containing `.trellis/`.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the feature file.
    pub fn features_path(&self) -> PathBuf {
        self.config.features_path(&self.root_dir)
    }

    /// Path of the invocation file.
    pub fn invocations_path(&self) -> PathBuf {
        self.config.invocations_path(&self.root_dir)
    }

    /// Records skipped while loading the data files.
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }

    /// Write the store back to its data files.
    ///
    /// This should be called after any mutating operations.
    pub async fn save(&self) -> Result<()> {
        save_to_jsonl(&self.store, &self.features_path(), &self.invocations_path()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use crate::domain::{Feature, FeatureId};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_app_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();

        let sub_dir = temp_dir.path().join("src").join("lib");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let app = App::from_directory(&sub_dir).await.unwrap();
        assert_eq!(app.root_dir(), temp_dir.path());
        assert!(app.load_warnings().is_empty());
    }

    #[tokio::test]
    async fn test_app_from_uninitialized_directory() {
        let temp_dir = TempDir::new().unwrap();

        let err = App::from_directory(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Not a trellis repository"));
    }

    #[tokio::test]
    async fn test_app_save_persists_store() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();
        app.store()
            .upsert_feature(Feature::new(
                FeatureId::new("Shop", "", "Checkout", "1"),
                ["Checkout()"],
            ))
            .await
            .unwrap();
        app.save().await.unwrap();

        let reopened = App::from_directory(temp_dir.path()).await.unwrap();
        assert_eq!(reopened.store().feature_count().await, 1);
    }
}
