//! Typed request/response surface for a hosting front-end.
//!
//! Each method corresponds to one operation the GUI shell used to invoke over
//! IPC; the `Result` is the tagged success/error union the uniform
//! `{success, ...}` envelope encoded. The notes file and the images directory
//! each get a mutex, so overlapping mutating calls from a cooperative event
//! loop are serialized instead of racing through independent
//! load-modify-store cycles.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::entity::{Memo, MemoUpdate, NewMemo};
use crate::error::{QuadraError, Result};
use crate::package::{self, ImportReport};
use crate::paths::{DataLocator, MigrateDirReport, IMAGES_DIR};
use crate::scan::{self, CleanupReport, MigrationReport};
use crate::store::{BlobStore, NoteStore};

/// Where the data currently lives, for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPathInfo {
    pub path: PathBuf,
    pub user_data: PathBuf,
    pub images_dir: PathBuf,
    pub images_exists: bool,
    pub image_count: usize,
}

pub struct StoreService {
    locator: DataLocator,
    notes_lock: Mutex<()>,
    images_lock: Mutex<()>,
}

impl StoreService {
    pub fn new(locator: DataLocator) -> Self {
        Self {
            locator,
            notes_lock: Mutex::new(()),
            images_lock: Mutex::new(()),
        }
    }

    pub fn from_system() -> Self {
        Self::new(DataLocator::from_system())
    }

    /// The resolved data root. Re-resolved on every operation, so a config
    /// override written mid-session takes effect on the next call.
    pub fn data_dir(&self) -> PathBuf {
        self.locator.resolve()
    }

    fn notes(&self) -> NoteStore {
        NoteStore::new(&self.data_dir())
    }

    fn blobs(&self) -> BlobStore {
        BlobStore::new(&self.data_dir())
    }

    pub async fn load_data(&self) -> Result<Vec<Memo>> {
        self.notes().load()
    }

    pub async fn save_data(&self, data: &Value) -> Result<()> {
        let _guard = self.notes_lock.lock().await;
        self.notes().save_raw(data)
    }

    pub async fn add_memo(&self, new: NewMemo) -> Result<i64> {
        let _guard = self.notes_lock.lock().await;
        self.notes().add(new)
    }

    pub async fn update_memo(&self, id: i64, update: MemoUpdate) -> Result<()> {
        let _guard = self.notes_lock.lock().await;
        match self.notes().update(id, update)? {
            0 => Err(QuadraError::MemoNotFound(id)),
            _ => Ok(()),
        }
    }

    pub async fn delete_memo(&self, id: i64) -> Result<usize> {
        let _guard = self.notes_lock.lock().await;
        self.notes().delete(id)
    }

    pub async fn save_image(&self, data: &str, suggested_name: &str) -> Result<String> {
        let _guard = self.images_lock.lock().await;
        self.blobs().save(data, suggested_name)
    }

    pub async fn get_image_path(&self, relative: &str) -> Result<PathBuf> {
        self.blobs().resolve(relative)
    }

    pub async fn get_image_base64(&self, relative: &str) -> Result<String> {
        self.blobs().read_as_data_uri(relative)
    }

    pub async fn export_package(&self, theme: &str) -> Result<Vec<u8>> {
        // same order as import_package, so cleanup cannot delete a blob
        // between the listing and the read
        let _notes = self.notes_lock.lock().await;
        let _images = self.images_lock.lock().await;
        package::export(&self.notes(), &self.blobs(), theme)
    }

    pub async fn import_package(&self, bytes: &[u8]) -> Result<ImportReport> {
        let _notes = self.notes_lock.lock().await;
        let _images = self.images_lock.lock().await;
        package::import(&self.notes(), &self.blobs(), bytes)
    }

    pub async fn cleanup_unused_images(&self) -> Result<CleanupReport> {
        let _guard = self.images_lock.lock().await;
        scan::cleanup(&self.notes(), &self.blobs())
    }

    pub async fn migrate_inline_images(&self) -> Result<MigrationReport> {
        let _notes = self.notes_lock.lock().await;
        let _images = self.images_lock.lock().await;
        scan::migrate_inline_images(&self.notes(), &self.blobs())
    }

    pub async fn migrate_data_directory(&self, new_path: &Path) -> Result<MigrateDirReport> {
        let _notes = self.notes_lock.lock().await;
        let _images = self.images_lock.lock().await;
        self.locator.migrate_data_directory(new_path)
    }

    pub async fn data_path_info(&self) -> Result<DataPathInfo> {
        let path = self.data_dir();
        let images_dir = path.join(IMAGES_DIR);
        let image_count = self.blobs().list()?.len();
        Ok(DataPathInfo {
            images_exists: images_dir.is_dir(),
            image_count,
            images_dir,
            user_data: self.locator.user_data_dir().to_path_buf(),
            path,
        })
    }
}
