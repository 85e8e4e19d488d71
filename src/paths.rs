use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::entity::Settings;
use crate::error::Result;

pub const MEMOS_FILE: &str = "memos.json";
pub const IMAGES_DIR: &str = "images";
pub const CONFIG_FILE: &str = "config.json";

const APP_DIR: &str = "quadra";
const LEGACY_DIR: &str = "QuadrantTodo";

/// Outcome of a data-directory migration.
#[derive(Debug, Clone)]
pub struct MigrateDirReport {
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub changed: bool,
}

/// Resolves the effective data root for all persisted state.
///
/// Priority: a `dataPath` override recorded in config.json, then the legacy
/// `QuadrantTodo/` subdirectory when it still holds data, then the per-user
/// application directory itself.
#[derive(Debug, Clone)]
pub struct DataLocator {
    user_data_dir: PathBuf,
}

impl DataLocator {
    /// Locator rooted at an explicit per-user directory. Tests use this.
    pub fn new(user_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_data_dir: user_data_dir.into(),
        }
    }

    /// Locator rooted at the platform config directory.
    pub fn from_system() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(APP_DIR))
    }

    pub fn user_data_dir(&self) -> &Path {
        &self.user_data_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.user_data_dir.join(CONFIG_FILE)
    }

    /// Resolve the data root. Never errors: an unreadable or corrupt
    /// config.json is treated the same as a missing one.
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = self.override_path() {
            return path;
        }

        let legacy = self.user_data_dir.join(LEGACY_DIR);
        if legacy.exists()
            && (legacy.join(MEMOS_FILE).exists() || legacy.join(IMAGES_DIR).exists())
        {
            debug!(path = %legacy.display(), "using legacy data directory");
            return legacy;
        }

        if !self.user_data_dir.exists() {
            let _ = fs::create_dir_all(&self.user_data_dir);
        }
        self.user_data_dir.clone()
    }

    fn override_path(&self) -> Option<PathBuf> {
        let raw = fs::read_to_string(self.config_path()).ok()?;
        let settings: Settings = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, "ignoring unreadable config.json");
                return None;
            }
        };
        let data_path = PathBuf::from(settings.data_path?);
        if data_path.is_dir() {
            Some(data_path)
        } else {
            None
        }
    }

    /// Copy memos.json and the images directory to `new_path`, then record
    /// the override in config.json. Takes effect on the next resolve.
    pub fn migrate_data_directory(&self, new_path: &Path) -> Result<MigrateDirReport> {
        let old_path = self.resolve();

        if old_path == new_path {
            return Ok(MigrateDirReport {
                old_path,
                new_path: new_path.to_path_buf(),
                changed: false,
            });
        }

        fs::create_dir_all(new_path)?;

        let old_memos = old_path.join(MEMOS_FILE);
        if old_memos.exists() {
            fs::copy(&old_memos, new_path.join(MEMOS_FILE))?;
        }

        let old_images = old_path.join(IMAGES_DIR);
        if old_images.is_dir() {
            let new_images = new_path.join(IMAGES_DIR);
            fs::create_dir_all(&new_images)?;
            for entry in fs::read_dir(&old_images)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    fs::copy(entry.path(), new_images.join(entry.file_name()))?;
                }
            }
        }

        let settings = Settings {
            data_path: Some(new_path.to_string_lossy().into_owned()),
            last_modified: Some(chrono::Utc::now().to_rfc3339()),
        };
        fs::create_dir_all(&self.user_data_dir)?;
        fs::write(
            self.config_path(),
            serde_json::to_string_pretty(&settings)?,
        )?;

        info!(from = %old_path.display(), to = %new_path.display(), "data directory migrated");

        Ok(MigrateDirReport {
            old_path,
            new_path: new_path.to_path_buf(),
            changed: true,
        })
    }
}
