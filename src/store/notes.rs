use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::entity::{Memo, MemoUpdate, NewMemo};
use crate::error::{QuadraError, Result};
use crate::paths::MEMOS_FILE;

/// Authoritative store for the memo collection, one JSON array in one file.
///
/// There is no in-memory cache: every mutation reloads memos.json, edits the
/// collection, and rewrites the whole file. This gives read-after-write
/// consistency within the process; callers wanting isolation between
/// overlapping mutations serialize through [`StoreService`](crate::service::StoreService).
pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(MEMOS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection. A missing or empty file is an empty collection,
    /// and malformed JSON degrades to an empty collection after one repair
    /// pass (BOM strip) - the UI must never hard-fail on load.
    pub fn load(&self) -> Result<Vec<Memo>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&raw) {
            Ok(memos) => Ok(memos),
            Err(first) => {
                let repaired = raw.trim_start_matches('\u{feff}');
                match serde_json::from_str(repaired) {
                    Ok(memos) => Ok(memos),
                    Err(_) => {
                        warn!(
                            path = %self.path.display(),
                            error = %first,
                            "memos file is corrupt, treating as empty"
                        );
                        Ok(Vec::new())
                    }
                }
            }
        }
    }

    /// Overwrite the collection. The serialized text is re-parsed before the
    /// write commits, so a serialization bug cannot clobber the file.
    pub fn save(&self, memos: &[Memo]) -> Result<()> {
        let serialized = serde_json::to_string_pretty(memos)?;
        let _: Vec<Memo> = serde_json::from_str(&serialized)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Overwrite from an untyped payload, as received over the RPC boundary.
    /// Non-array payloads are rejected before anything touches disk.
    pub fn save_raw(&self, data: &Value) -> Result<()> {
        if !data.is_array() {
            return Err(QuadraError::InvalidPayload(
                "memo data must be an array".to_string(),
            ));
        }
        let serialized = serde_json::to_string_pretty(data)?;
        let _: Value = serde_json::from_str(&serialized)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Append a new memo, assigning an id and creation time. The id comes
    /// from the millisecond clock, bumped past any existing id so two adds
    /// within the same millisecond stay unique.
    pub fn add(&self, new: NewMemo) -> Result<i64> {
        let mut memos = self.load()?;

        let now = chrono::Utc::now().timestamp_millis();
        let mut id = now;
        while memos.iter().any(|m| m.id == id) {
            id += 1;
        }

        memos.push(Memo {
            id,
            title: new.title,
            content: new.content,
            quadrant: new.quadrant,
            created: now,
            completed: false,
            completed_time: None,
            sort_order: None,
        });
        self.save(&memos)?;
        Ok(id)
    }

    /// Merge the supplied fields into the memo with this id. Returns the
    /// number of memos changed (0 or 1); on 0 the file is left untouched.
    pub fn update(&self, id: i64, update: MemoUpdate) -> Result<usize> {
        let mut memos = self.load()?;
        match memos.iter_mut().find(|m| m.id == id) {
            Some(memo) => {
                memo.apply(update);
                self.save(&memos)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    /// Remove the memo with this id. Returns the number removed (0 or 1);
    /// deleting an unknown id is a no-op.
    pub fn delete(&self, id: i64) -> Result<usize> {
        let mut memos = self.load()?;
        let before = memos.len();
        memos.retain(|m| m.id != id);
        let removed = before - memos.len();
        if removed > 0 {
            self.save(&memos)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Quadrant;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> NoteStore {
        NoteStore::new(tmp.path())
    }

    fn sample(id: i64, title: &str) -> Memo {
        Memo {
            id,
            title: title.to_string(),
            content: String::new(),
            quadrant: Quadrant::UrgentImportant,
            created: id,
            completed: false,
            completed_time: None,
            sort_order: None,
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(store(&tmp).load().unwrap().is_empty());
    }

    #[test]
    fn test_load_empty_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MEMOS_FILE), "  \n").unwrap();
        assert!(store(&tmp).load().unwrap().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_degrades_to_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MEMOS_FILE), "not json").unwrap();
        assert!(store(&tmp).load().unwrap().is_empty());
    }

    #[test]
    fn test_load_repairs_bom_prefix() {
        let tmp = TempDir::new().unwrap();
        let body = format!(
            "\u{feff}{}",
            serde_json::to_string(&[sample(1, "bom")]).unwrap()
        );
        fs::write(tmp.path().join(MEMOS_FILE), body).unwrap();
        let memos = store(&tmp).load().unwrap();
        assert_eq!(memos.len(), 1);
        assert_eq!(memos[0].title, "bom");
    }

    #[test]
    fn test_load_reads_legacy_tagged_document() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(MEMOS_FILE),
            r#"[{"id": 1716000000000, "title": "old install", "content": "",
                 "quadrant": "urgent-important", "created": 1716000000000,
                 "completed": false, "sortOrder": 2}]"#,
        )
        .unwrap();

        let memos = store(&tmp).load().unwrap();
        assert_eq!(memos.len(), 1);
        assert_eq!(memos[0].quadrant, Quadrant::UrgentImportant);
        assert_eq!(memos[0].sort_order, Some(2));
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        let memos = vec![sample(1, "one"), sample(2, "two")];
        s.save(&memos).unwrap();
        assert_eq!(s.load().unwrap(), memos);
    }

    #[test]
    fn test_save_raw_rejects_non_array() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        let err = s.save_raw(&json!({"id": 1})).unwrap_err();
        assert!(matches!(err, QuadraError::InvalidPayload(_)));
        assert!(!tmp.path().join(MEMOS_FILE).exists());
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        let a = s
            .add(NewMemo {
                title: "a".to_string(),
                content: String::new(),
                quadrant: Quadrant::UrgentImportant,
            })
            .unwrap();
        let b = s
            .add(NewMemo {
                title: "b".to_string(),
                content: String::new(),
                quadrant: Quadrant::UrgentNotImportant,
            })
            .unwrap();
        assert_ne!(a, b);

        let memos = s.load().unwrap();
        assert_eq!(memos.len(), 2);
        assert!(memos.iter().any(|m| m.id == a && m.title == "a"));
        assert!(memos.iter().any(|m| m.id == b && m.quadrant == Quadrant::UrgentNotImportant));
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        s.save(&[sample(5, "keep me")]).unwrap();

        let changed = s
            .update(
                5,
                MemoUpdate {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(changed, 1);

        let memos = s.load().unwrap();
        assert_eq!(memos[0].title, "keep me");
        assert_eq!(memos[0].quadrant, Quadrant::UrgentImportant);
        assert!(memos[0].completed);
    }

    #[test]
    fn test_update_missing_id_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        s.save(&[sample(5, "only")]).unwrap();
        let before = fs::read_to_string(s.path()).unwrap();

        let changed = s
            .update(
                99,
                MemoUpdate {
                    title: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(fs::read_to_string(s.path()).unwrap(), before);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let tmp = TempDir::new().unwrap();
        let s = store(&tmp);
        s.save(&[sample(1, "one"), sample(2, "two")]).unwrap();

        assert_eq!(s.delete(1).unwrap(), 1);
        let memos = s.load().unwrap();
        assert_eq!(memos.len(), 1);
        assert_eq!(memos[0].id, 2);

        assert_eq!(s.delete(1).unwrap(), 0);
    }
}
