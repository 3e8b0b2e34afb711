use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Transfer;

/// A receiving device registered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// A transfer waiting to be picked up by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransfer {
    pub transfer_id: String,
    pub token: String,
    pub files: Vec<PendingFile>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl PendingTransfer {
    /// Snapshot of `transfer` taken now. Paths are left behind.
    pub fn from_transfer(transfer: &Transfer) -> Self {
        let files = transfer
            .files
            .iter()
            .map(|f| PendingFile {
                name: f.name.clone(),
                mime: f.mime.clone(),
                size: f.size,
            })
            .collect();

        Self {
            transfer_id: transfer.id.clone(),
            token: transfer.token.clone(),
            files,
            sent_at: Utc::now(),
        }
    }
}
