//! Zip-based export/import of the whole store: one `data.json` envelope plus
//! every image blob under `images/`. Import is a destructive replace of both
//! memos and images, never a merge. A failure after the images directory has
//! been cleared but before memos are written leaves mixed state; there is no
//! rollback.

use std::fs;
use std::io::{Cursor, Read, Write};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{QuadraError, Result};
use crate::store::{BlobStore, NoteStore};

const PACKAGE_VERSION: &str = "2.0.0";
const DATA_ENTRY: &str = "data.json";

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub theme: Option<String>,
}

/// Bundle the current memos, the given theme, and every stored image into a
/// single deflate-compressed archive.
pub fn export(notes: &NoteStore, blobs: &BlobStore, theme: &str) -> Result<Vec<u8>> {
    let memos = notes.load()?;

    let envelope = json!({
        "version": PACKAGE_VERSION,
        "exportTime": chrono::Utc::now().to_rfc3339(),
        "data": {
            "memos": memos,
            "theme": theme,
        },
    });

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(DATA_ENTRY, options)?;
    writer.write_all(serde_json::to_string_pretty(&envelope)?.as_bytes())?;

    let mut added = 0usize;
    for name in blobs.list()? {
        let bytes = fs::read(blobs.images_dir().join(&name))?;
        writer.start_file(format!("images/{}", name), options)?;
        writer.write_all(&bytes)?;
        added += 1;
    }

    let cursor = writer.finish()?;
    info!(memos = envelope["data"]["memos"].as_array().map(Vec::len).unwrap_or(0),
          images = added, "package exported");
    Ok(cursor.into_inner())
}

/// Unpack an archive over the current state: the images directory is cleared
/// and refilled from the archive, then memos.json is overwritten with the
/// archive's memo array. Anything not in the archive is lost.
pub fn import(notes: &NoteStore, blobs: &BlobStore, bytes: &[u8]) -> Result<ImportReport> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let envelope: Value = {
        let mut entry = archive.by_name(DATA_ENTRY).map_err(|_| {
            QuadraError::InvalidPackage("archive has no data.json entry".to_string())
        })?;
        let mut raw = String::new();
        entry.read_to_string(&mut raw)?;
        serde_json::from_str(&raw)
            .map_err(|e| QuadraError::InvalidPackage(format!("data.json is not valid JSON: {}", e)))?
    };

    let memos = envelope
        .pointer("/data/memos")
        .filter(|v| v.is_array())
        .cloned()
        .ok_or_else(|| {
            QuadraError::InvalidPackage("data.data.memos is missing or not an array".to_string())
        })?;
    let theme = envelope
        .pointer("/data/theme")
        .and_then(Value::as_str)
        .map(str::to_string);

    // Replace semantics start here; from this point a failure leaves mixed state.
    blobs.clear()?;

    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(index = i, error = %e, "skipping unreadable archive entry");
                continue;
            }
        };
        let entry_name = entry.name().to_string();
        if entry.is_dir() || !entry_name.starts_with("images/") {
            continue;
        }
        let file_name = match entry_name.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let mut data = Vec::new();
        if let Err(e) = entry.read_to_end(&mut data) {
            warn!(file = file_name, error = %e, "skipping unreadable archive image");
            continue;
        }
        if let Err(e) = blobs.write_named(&file_name, &data) {
            warn!(file = file_name, error = %e, "failed to write imported image");
        }
    }

    notes.save_raw(&memos)?;

    let imported = memos.as_array().map(Vec::len).unwrap_or(0);
    info!(imported, "package imported");
    Ok(ImportReport { imported, theme })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Memo, Quadrant};
    use tempfile::TempDir;

    fn memo(id: i64, title: &str) -> Memo {
        Memo {
            id,
            title: title.to_string(),
            content: String::new(),
            quadrant: Quadrant::ImportantNotUrgent,
            created: id,
            completed: false,
            completed_time: None,
            sort_order: None,
        }
    }

    fn stores(tmp: &TempDir) -> (NoteStore, BlobStore) {
        (NoteStore::new(tmp.path()), BlobStore::new(tmp.path()))
    }

    #[test]
    fn test_export_import_empty_store() {
        let src = TempDir::new().unwrap();
        let (notes, blobs) = stores(&src);

        let bytes = export(&notes, &blobs, "light").unwrap();

        let dst = TempDir::new().unwrap();
        let (dst_notes, dst_blobs) = stores(&dst);
        let report = import(&dst_notes, &dst_blobs, &bytes).unwrap();

        assert_eq!(report.imported, 0);
        assert_eq!(report.theme.as_deref(), Some("light"));
        assert!(dst_notes.load().unwrap().is_empty());
        assert!(dst_blobs.list().unwrap().is_empty());
    }

    #[test]
    fn test_import_fully_replaces_existing_state() {
        let src = TempDir::new().unwrap();
        let (notes, blobs) = stores(&src);
        notes.save(&[memo(1, "exported-a"), memo(2, "exported-b")]).unwrap();
        blobs.write_named("kept.jpg", b"kept").unwrap();

        let bytes = export(&notes, &blobs, "dark").unwrap();

        let dst = TempDir::new().unwrap();
        let (dst_notes, dst_blobs) = stores(&dst);
        dst_notes.save(&[memo(9, "pre-existing")]).unwrap();
        dst_blobs.write_named("stale.jpg", b"stale").unwrap();

        let report = import(&dst_notes, &dst_blobs, &bytes).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.theme.as_deref(), Some("dark"));

        let after = dst_notes.load().unwrap();
        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|m| m.title.starts_with("exported-")));

        let images = dst_blobs.list().unwrap();
        assert_eq!(images, vec!["kept.jpg".to_string()]);
        assert_eq!(
            fs::read(dst_blobs.images_dir().join("kept.jpg")).unwrap(),
            b"kept"
        );
    }

    #[test]
    fn test_import_rejects_archive_without_data_json() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.txt", FileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let tmp = TempDir::new().unwrap();
        let (notes, blobs) = stores(&tmp);
        let err = import(&notes, &blobs, &bytes).unwrap_err();
        assert!(matches!(err, QuadraError::InvalidPackage(_)));
    }

    #[test]
    fn test_import_rejects_non_array_memos() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DATA_ENTRY, FileOptions::default())
            .unwrap();
        writer
            .write_all(br#"{"version":"2.0.0","data":{"memos":{"oops":true}}}"#)
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let tmp = TempDir::new().unwrap();
        let (notes, blobs) = stores(&tmp);
        notes.save(&[memo(1, "untouched")]).unwrap();

        let err = import(&notes, &blobs, &bytes).unwrap_err();
        assert!(matches!(err, QuadraError::InvalidPackage(_)));
        // validation failed before any replace began
        assert_eq!(notes.load().unwrap().len(), 1);
    }

    #[test]
    fn test_exported_envelope_shape() {
        let tmp = TempDir::new().unwrap();
        let (notes, blobs) = stores(&tmp);
        notes.save(&[memo(1, "only")]).unwrap();

        let bytes = export(&notes, &blobs, "light").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut raw = String::new();
        archive
            .by_name(DATA_ENTRY)
            .unwrap()
            .read_to_string(&mut raw)
            .unwrap();

        let envelope: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(envelope["version"], PACKAGE_VERSION);
        assert!(envelope["exportTime"].is_string());
        assert_eq!(envelope["data"]["theme"], "light");
        assert_eq!(envelope["data"]["memos"][0]["title"], "only");
    }
}
