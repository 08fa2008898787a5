use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type EntryId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Active,
    Completed,
}

impl EntryStatus {
    pub fn toggled(self) -> Self {
        match self {
            EntryStatus::Active => EntryStatus::Completed,
            EntryStatus::Completed => EntryStatus::Active,
        }
    }

    pub fn is_completed(self) -> bool {
        self == EntryStatus::Completed
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Active => write!(f, "active"),
            EntryStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: EntryId,
    pub created_at: String,
    pub content: String,
    pub status: EntryStatus,
}

impl DiaryEntry {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Human readable form of `created_at`. The server sends either a plain
    /// date or a timestamp; anything else is shown as received.
    pub fn created_label(&self) -> String {
        let raw = self.created_at.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.format("%A, %B %-d, %Y").to_string();
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
            return stamp.format("%A, %B %-d, %Y %H:%M").to_string();
        }
        if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return stamp.format("%A, %B %-d, %Y %H:%M").to_string();
        }
        raw.to_string()
    }

    /// First line of the content, used by the list preview.
    pub fn headline(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }
}

/// Request body shared by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPayload {
    pub content: String,
    pub status: EntryStatus,
}

impl EntryPayload {
    pub fn new(content: impl Into<String>, status: EntryStatus) -> Self {
        EntryPayload {
            content: content.into(),
            status,
        }
    }
}
