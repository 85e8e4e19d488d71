//! Reference scanning over memo content, and the maintenance operations
//! built on it: unused-image cleanup and the one-way migration of inline
//! base64 images out to blob files.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{NoExpand, Regex};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::store::{BlobStore, NoteStore};

/// URI scheme the front-end uses to reference stored images from memo HTML.
pub const IMAGE_URI_PREFIX: &str = "app://local-file/images/";

/// Image filenames referenced by this content. A filename token runs until
/// whitespace, a quote, or a closing angle bracket.
pub fn referenced_images(content: &str) -> HashSet<String> {
    let re = Regex::new(r#"app://local-file/images/([^\s"'>]+)"#).unwrap();
    re.captures_iter(content).map(|c| c[1].to_string()).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub cleaned: usize,
    pub total: usize,
    pub used: usize,
}

/// Delete every stored image no memo references. Pure function of the
/// current memos and blobs; a second run with no intervening writes cleans
/// nothing.
pub fn cleanup(notes: &NoteStore, blobs: &BlobStore) -> Result<CleanupReport> {
    let memos = notes.load()?;

    let mut live: HashSet<String> = HashSet::new();
    for memo in &memos {
        live.extend(referenced_images(&memo.content));
    }

    let on_disk = blobs.list()?;
    let total = on_disk.len();
    let unused: Vec<&str> = on_disk
        .iter()
        .map(String::as_str)
        .filter(|name| !live.contains(*name))
        .collect();

    let outcome = blobs.delete_many(unused);
    info!(
        cleaned = outcome.deleted,
        total,
        used = live.len(),
        "image cleanup finished"
    );

    Ok(CleanupReport {
        cleaned: outcome.deleted,
        total,
        used: live.len(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub migrated: usize,
}

/// Rewrite inline `<img src="data:image/...;base64,...">` tags to reference
/// URIs, writing each payload out as a blob file. Memos are persisted only
/// when at least one tag was rewritten, so re-running on migrated content is
/// a no-op. Matches with an empty payload are skipped, as are individual
/// decode or write failures.
pub fn migrate_inline_images(notes: &NoteStore, blobs: &BlobStore) -> Result<MigrationReport> {
    let tag_re = Regex::new(r#"<img[^>]+src="data:image/([^;]+);base64,([^"]*)"[^>]*>"#).unwrap();
    let src_re = Regex::new(r#"src="data:image/[^;]+;base64,[^"]*""#).unwrap();

    let mut memos = notes.load()?;
    let mut migrated = 0usize;
    let mut dirty = false;

    for memo in &mut memos {
        if !tag_re.is_match(&memo.content) {
            continue;
        }

        let rewritten = tag_re
            .replace_all(&memo.content, |caps: &regex::Captures| {
                let full_tag = caps[0].to_string();
                let image_type = &caps[1];
                let payload = &caps[2];

                if payload.is_empty() {
                    return full_tag;
                }

                let bytes = match STANDARD.decode(payload) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(error = %e, "skipping undecodable inline image");
                        return full_tag;
                    }
                };

                let name = format!(
                    "migrated_{}_{}.{}",
                    chrono::Utc::now().timestamp_millis(),
                    crate::store::blob_token(),
                    image_type
                );
                if let Err(e) = blobs.write_named(&name, &bytes) {
                    warn!(file = name, error = %e, "failed to write migrated image");
                    return full_tag;
                }

                migrated += 1;
                let new_src = format!("src=\"{}{}\"", IMAGE_URI_PREFIX, name);
                src_re.replace(&full_tag, NoExpand(&new_src)).into_owned()
            })
            .into_owned();

        if rewritten != memo.content {
            memo.content = rewritten;
            dirty = true;
        }
    }

    if dirty {
        notes.save(&memos)?;
        info!(migrated, "inline images migrated to blob files");
    }

    Ok(MigrationReport { migrated })
}
