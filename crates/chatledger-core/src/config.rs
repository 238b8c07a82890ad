//! Storage configuration.
//!
//! Tells the rest of the crate where the chat application's data store lives and
//! where avatar backups may be written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::avatar::{FsCopier, PrivilegedCopier, ShellCopier};
use crate::{Error, Result};

/// Default location of the application's data store on a device.
pub const DEFAULT_MICRO_MSG_PATH: &str = "/data/data/com.tencent.mm/MicroMsg";

/// Provides the two directories account paths are derived from.
pub trait StorageRoots {
    /// Root holding one directory per local user.
    fn base_storage_path(&self) -> &Path;
    /// Writable directory for avatar backups.
    fn avatar_backup_root(&self) -> &Path;
}

/// How avatars are copied out of the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyMode {
    /// `cp` through `su -c` (rooted device).
    #[default]
    Root,
    /// `cp` through `sh -c`.
    Shell,
    /// In-process file copy.
    Direct,
}

/// Storage settings, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// The application's `MicroMsg` directory.
    pub micro_msg_path: PathBuf,
    /// Directory for avatar backups.
    pub avatar_backup_path: PathBuf,
    /// Copy strategy.
    pub copy_mode: CopyMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let backup = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatledger")
            .join("avatar");
        Self {
            micro_msg_path: PathBuf::from(DEFAULT_MICRO_MSG_PATH),
            avatar_backup_path: backup,
            copy_mode: CopyMode::default(),
        }
    }
}

impl StorageConfig {
    /// Create a config with explicit roots and the default copy mode.
    #[must_use]
    pub fn new(micro_msg_path: impl Into<PathBuf>, avatar_backup_path: impl Into<PathBuf>) -> Self {
        Self {
            micro_msg_path: micro_msg_path.into(),
            avatar_backup_path: avatar_backup_path.into(),
            copy_mode: CopyMode::default(),
        }
    }

    /// Set the copy mode.
    #[must_use]
    pub fn with_copy_mode(mut self, copy_mode: CopyMode) -> Self {
        self.copy_mode = copy_mode;
        self
    }

    /// Default config file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatledger")
            .join("config.json")
    }

    /// Load settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON, or if a
    /// configured path is empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        tracing::debug!("Config loaded from {:?}", path);
        Ok(config)
    }

    /// Write settings to `path` as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        tracing::info!("Config saved to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.micro_msg_path.as_os_str().is_empty() {
            return Err(Error::Config("micro_msg_path must not be empty".to_string()));
        }
        if self.avatar_backup_path.as_os_str().is_empty() {
            return Err(Error::Config(
                "avatar_backup_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Create the backup directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_backup_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.avatar_backup_path)?;
        Ok(())
    }

    /// Copier matching the configured mode.
    #[must_use]
    pub fn copier(&self) -> Arc<dyn PrivilegedCopier> {
        match self.copy_mode {
            CopyMode::Root => Arc::new(ShellCopier::root()),
            CopyMode::Shell => Arc::new(ShellCopier::unprivileged()),
            CopyMode::Direct => Arc::new(FsCopier),
        }
    }
}

impl StorageRoots for StorageConfig {
    fn base_storage_path(&self) -> &Path {
        &self.micro_msg_path
    }

    fn avatar_backup_root(&self) -> &Path {
        &self.avatar_backup_path
    }
}
