use std::fs;
use std::path::{Path, PathBuf};

use crate::entity::{MemoUpdate, NewMemo, Quadrant};
use crate::error::{QuadraError, Result};
use crate::paths::DataLocator;
use crate::service::StoreService;

/// Build the service for this invocation, honoring --data-dir.
pub fn build_service(data_dir: Option<PathBuf>) -> StoreService {
    match data_dir {
        Some(dir) => StoreService::new(DataLocator::new(dir)),
        None => StoreService::from_system(),
    }
}

fn parse_quadrant(s: &str) -> Result<Quadrant> {
    s.parse()
        .map_err(|_| QuadraError::InvalidQuadrant(s.to_string()))
}

pub async fn handle_list(
    service: &StoreService,
    quadrant: Option<String>,
    json: bool,
) -> Result<()> {
    let mut memos = service.load_data().await?;

    if let Some(q) = quadrant {
        let q = parse_quadrant(&q)?;
        memos.retain(|m| m.quadrant == q);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&memos)?);
        return Ok(());
    }

    if memos.is_empty() {
        println!("No memos.");
        return Ok(());
    }
    for memo in &memos {
        let mark = if memo.completed { "x" } else { " " };
        println!("[{}] [{}] {} - {}", mark, memo.quadrant, memo.id, memo.title);
    }
    Ok(())
}

pub async fn handle_add(
    service: &StoreService,
    title: String,
    quadrant: String,
    content: String,
    json: bool,
) -> Result<()> {
    let quadrant = parse_quadrant(&quadrant)?;
    let id = service
        .add_memo(NewMemo {
            title: title.clone(),
            content,
            quadrant,
        })
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "id": id, "title": title, "quadrant": quadrant })
        );
    } else {
        println!("Created memo {} [{}] - {}", id, quadrant, title);
    }
    Ok(())
}

pub async fn handle_update(
    service: &StoreService,
    id: i64,
    title: Option<String>,
    content: Option<String>,
    quadrant: Option<String>,
    sort_order: Option<i64>,
) -> Result<()> {
    let quadrant = match quadrant {
        Some(q) => Some(parse_quadrant(&q)?),
        None => None,
    };

    service
        .update_memo(
            id,
            MemoUpdate {
                title,
                content,
                quadrant,
                sort_order: sort_order.map(Some),
                ..Default::default()
            },
        )
        .await?;

    println!("Updated memo {}", id);
    Ok(())
}

pub async fn handle_complete(service: &StoreService, id: i64) -> Result<()> {
    service
        .update_memo(
            id,
            MemoUpdate {
                completed: Some(true),
                completed_time: Some(Some(chrono::Utc::now().timestamp_millis())),
                ..Default::default()
            },
        )
        .await?;

    println!("Completed memo {}", id);
    Ok(())
}

pub async fn handle_delete(service: &StoreService, id: i64) -> Result<()> {
    let removed = service.delete_memo(id).await?;
    if removed == 0 {
        println!("No memo with id {}", id);
    } else {
        println!("Deleted memo {}", id);
    }
    Ok(())
}

pub async fn handle_export(service: &StoreService, file: &Path, theme: String) -> Result<()> {
    let bytes = service.export_package(&theme).await?;
    fs::write(file, &bytes)?;
    println!("Exported package to {} ({} bytes)", file.display(), bytes.len());
    Ok(())
}

pub async fn handle_import(service: &StoreService, file: &Path) -> Result<()> {
    let bytes = fs::read(file)?;
    let report = service.import_package(&bytes).await?;
    match report.theme {
        Some(theme) => println!("Imported {} memos (theme: {})", report.imported, theme),
        None => println!("Imported {} memos", report.imported),
    }
    Ok(())
}

pub async fn handle_cleanup(service: &StoreService) -> Result<()> {
    let report = service.cleanup_unused_images().await?;
    println!(
        "Cleaned {} of {} images, {} in use",
        report.cleaned, report.total, report.used
    );
    Ok(())
}

pub async fn handle_migrate_images(service: &StoreService) -> Result<()> {
    let report = service.migrate_inline_images().await?;
    println!("Migrated {} inline images to files", report.migrated);
    Ok(())
}

pub async fn handle_migrate_dir(service: &StoreService, path: &Path) -> Result<()> {
    let report = service.migrate_data_directory(path).await?;
    if report.changed {
        println!(
            "Migrated data from {} to {}",
            report.old_path.display(),
            report.new_path.display()
        );
    } else {
        println!("Data directory unchanged");
    }
    Ok(())
}

pub async fn handle_info(service: &StoreService, json: bool) -> Result<()> {
    let info = service.data_path_info().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Data directory: {}", info.path.display());
        println!("User data:      {}", info.user_data.display());
        if info.images_exists {
            println!("Images:         {} file(s)", info.image_count);
        } else {
            println!("Images:         (none)");
        }
    }
    Ok(())
}
