use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::warn;

use crate::error::{QuadraError, Result};
use crate::paths::IMAGES_DIR;

/// Result of a best-effort batch deletion. `failures` carries the skipped
/// filenames with their causes, so callers can tell "all succeeded" from
/// "some were silently dropped".
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub deleted: usize,
    pub failures: Vec<(String, String)>,
}

/// Owns the images subdirectory under the data root. Blobs are plain files
/// named `<millis>_<token>.<ext>`; a blob is live iff some memo's content
/// references it.
pub struct BlobStore {
    images_dir: PathBuf,
}

impl BlobStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            images_dir: data_dir.join(IMAGES_DIR),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Decode base64 image data (with or without a `data:image/...;base64,`
    /// prefix) and write it under a collision-resistant filename. Returns the
    /// path relative to the data root, e.g. `images/1700000000000_ab12cd34e.jpg`.
    pub fn save(&self, data: &str, suggested_name: &str) -> Result<String> {
        fs::create_dir_all(&self.images_dir)?;

        let payload = strip_data_uri_prefix(data);
        let bytes = STANDARD.decode(payload.trim())?;

        let ext = Path::new(suggested_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let name = format!(
            "{}_{}.{}",
            chrono::Utc::now().timestamp_millis(),
            blob_token(),
            ext
        );

        fs::write(self.images_dir.join(&name), bytes)?;
        Ok(format!("{}/{}", IMAGES_DIR, name))
    }

    /// Write already-decoded bytes under an explicit filename. Used by the
    /// inline-image migration and package import, which pick their own names.
    pub fn write_named(&self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.images_dir)?;
        fs::write(self.images_dir.join(name), bytes)?;
        Ok(())
    }

    /// Absolute path for a data-root-relative image path.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let full = self.root().join(relative);
        if full.is_file() {
            Ok(full)
        } else {
            Err(QuadraError::ImageNotFound(relative.to_string()))
        }
    }

    /// Read an image back as a base64 data URI.
    pub fn read_as_data_uri(&self, relative: &str) -> Result<String> {
        let full = self.resolve(relative)?;
        let bytes = fs::read(full)?;
        Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes)))
    }

    /// Filenames of every regular file in the images directory. A missing
    /// directory is an empty listing.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.images_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.images_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    /// Delete the named files, best-effort. Individual failures are logged
    /// and recorded, never fatal to the batch.
    pub fn delete_many<I, S>(&self, names: I) -> BatchOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcome = BatchOutcome::default();
        for name in names {
            let name = name.as_ref();
            match fs::remove_file(self.images_dir.join(name)) {
                Ok(()) => outcome.deleted += 1,
                Err(e) => {
                    warn!(file = name, error = %e, "failed to delete image");
                    outcome.failures.push((name.to_string(), e.to_string()));
                }
            }
        }
        outcome
    }

    /// Remove every file in the images directory, creating it if absent.
    /// Package import uses this for its replace semantics.
    pub fn clear(&self) -> Result<()> {
        if self.images_dir.is_dir() {
            for entry in fs::read_dir(&self.images_dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    fs::remove_file(entry.path())?;
                }
            }
        } else {
            fs::create_dir_all(&self.images_dir)?;
        }
        Ok(())
    }

    fn root(&self) -> &Path {
        // images_dir always has the data root as parent
        self.images_dir.parent().unwrap_or(&self.images_dir)
    }
}

fn strip_data_uri_prefix(data: &str) -> &str {
    if data.starts_with("data:") {
        match data.find(',') {
            Some(idx) => &data[idx + 1..],
            None => data,
        }
    } else {
        data
    }
}

pub(crate) fn blob_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}
