// src/entity/memo.rs
use serde::{Deserialize, Serialize};

/// The four priority categories. Serialized forms are the tag strings the
/// legacy memos.json schema uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    #[default]
    UrgentImportant,
    ImportantNotUrgent,
    UrgentNotImportant,
    NotUrgentNotImportant,
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quadrant::UrgentImportant => write!(f, "urgent-important"),
            Quadrant::ImportantNotUrgent => write!(f, "important-not-urgent"),
            Quadrant::UrgentNotImportant => write!(f, "urgent-not-important"),
            Quadrant::NotUrgentNotImportant => write!(f, "not-urgent-not-important"),
        }
    }
}

impl std::str::FromStr for Quadrant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "urgent-important" | "q1" => Ok(Quadrant::UrgentImportant),
            "important-not-urgent" | "q2" => Ok(Quadrant::ImportantNotUrgent),
            "urgent-not-important" | "q3" => Ok(Quadrant::UrgentNotImportant),
            "not-urgent-not-important" | "q4" => Ok(Quadrant::NotUrgentNotImportant),
            _ => Err(format!("Invalid quadrant: {}", s)),
        }
    }
}

/// A single todo record. Field names mirror the legacy memos.json schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Memo {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub quadrant: Quadrant,
    pub created: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "completedTime", skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<i64>,
    #[serde(rename = "sortOrder", skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

/// Fields supplied when creating a memo; id and creation time are assigned
/// by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMemo {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub quadrant: Quadrant,
}

/// Partial-merge update payload. Only fields present are written; everything
/// else on the memo is left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub quadrant: Option<Quadrant>,
    pub completed: Option<bool>,
    #[serde(rename = "completedTime")]
    pub completed_time: Option<Option<i64>>, // Some(None) to clear
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<Option<i64>>, // Some(None) to clear
}

impl Memo {
    pub fn apply(&mut self, update: MemoUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(quadrant) = update.quadrant {
            self.quadrant = quadrant;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(completed_time) = update.completed_time {
            self.completed_time = completed_time;
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
    }
}
