use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use super::Category;

/// An uploaded bundle of files reachable through its ID and token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    pub token: String,
    pub category: Category,
    #[serde(skip)]
    pub pin_hash: String,
    pub files: Vec<StoredFile>,
    pub created_at: DateTime<Utc>,
}

impl Transfer {
    pub fn requires_pin(&self) -> bool {
        !self.pin_hash.is_empty()
    }

    pub fn find_file(&self, file_id: &str) -> Option<&StoredFile> {
        if file_id.is_empty() {
            return None;
        }
        self.files.iter().find(|f| f.id == file_id)
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// A single file inside a transfer.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub id: String,
    /// Name as supplied by the uploader. Not safe for use as a path.
    pub name: String,
    pub mime: String,
    pub size: u64,
    #[serde(skip)]
    pub path: PathBuf,
}

impl StoredFile {
    pub fn file_id(transfer_id: &str, index: usize) -> String {
        format!("{}-{:02}", transfer_id, index)
    }
}
