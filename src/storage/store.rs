use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::fs::{self, DirBuilder, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::crypto::token::{TOKEN_BYTES, TRANSFER_ID_BYTES};
use crate::crypto::{hash_pin, random_hex, tokens_match};
use crate::{Category, FilePayload, MimeDetector, Result, StorageError, StoredFile, Transfer};

use super::sanitize::stored_filename;

/// Owns every live transfer and the directory tree holding their files.
///
/// A transfer is only ever visible in the map while its directory is fully
/// written: files land on disk before insertion and are deleted only after
/// removal. No lock is held while touching the filesystem.
pub struct TransferStore {
    root: PathBuf,
    transfers: RwLock<HashMap<String, Transfer>>,
    max_file_size: Option<u64>,
}

impl TransferStore {
    pub async fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_owned();
        fs::create_dir_all(&root).await?;
        let root = fs::canonicalize(&root).await?;

        info!(root = %root.display(), "transfer store opened");
        Ok(Self {
            root,
            transfers: RwLock::new(HashMap::new()),
            max_file_size: None,
        })
    }

    /// Rejects any single file larger than `bytes`.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn transfer_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Writes every payload into a fresh transfer directory and registers
    /// the transfer once all of them are on disk.
    ///
    /// On any failure the directory is removed before the error is returned,
    /// so nothing half-written is left behind.
    pub async fn save_files(
        &self,
        category: Category,
        pin: &str,
        files: Vec<FilePayload<'_>>,
    ) -> Result<Transfer> {
        if files.is_empty() {
            return Err(StorageError::EmptyUpload);
        }

        let id = random_hex(TRANSFER_ID_BYTES).map_err(|_| StorageError::Random)?;
        let token = random_hex(TOKEN_BYTES).map_err(|_| StorageError::Random)?;
        let dir = self.transfer_dir(&id);

        create_private_dir(&dir).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StorageError::Collision(id.clone()),
            _ => StorageError::Io(e),
        })?;

        let stored = match self.write_files(&id, &dir, files).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(transfer_id = %id, error = %e, "upload failed, rolling back");
                remove_dir(&dir).await;
                return Err(e);
            }
        };

        let transfer = {
            let mut transfers = self.transfers.write().await;
            match transfers.entry(id.clone()) {
                Entry::Occupied(_) => None,
                Entry::Vacant(slot) => {
                    let transfer = Transfer {
                        id: id.clone(),
                        token,
                        category,
                        pin_hash: hash_pin(pin),
                        files: stored,
                        created_at: Utc::now(),
                    };
                    Some(slot.insert(transfer).clone())
                }
            }
        };

        let Some(transfer) = transfer else {
            remove_dir(&dir).await;
            return Err(StorageError::Collision(id));
        };

        info!(
            transfer_id = %transfer.id,
            files = transfer.files.len(),
            bytes = transfer.total_size(),
            category = %transfer.category,
            pin = transfer.requires_pin(),
            "transfer created"
        );
        Ok(transfer)
    }

    async fn write_files(
        &self,
        transfer_id: &str,
        dir: &Path,
        files: Vec<FilePayload<'_>>,
    ) -> Result<Vec<StoredFile>> {
        let mut stored = Vec::with_capacity(files.len());

        for (index, payload) in files.into_iter().enumerate() {
            let path = dir.join(stored_filename(index, &payload.name));
            let size = self.write_file(&path, &payload.name, payload.content).await?;

            let mime = if payload.mime.trim().is_empty() {
                MimeDetector::resolve("", &read_head(&path).await?)
            } else {
                MimeDetector::resolve(&payload.mime, &[])
            };

            debug!(transfer_id, index, size, "file written");
            stored.push(StoredFile {
                id: StoredFile::file_id(transfer_id, index),
                name: payload.name,
                mime,
                size,
                path,
            });
        }

        Ok(stored)
    }

    async fn write_file<R>(&self, path: &Path, name: &str, mut content: R) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut out = create_private_file(path).await?;

        let size = match self.max_file_size {
            Some(limit) => {
                let mut limited = (&mut content).take(limit.saturating_add(1));
                let written = tokio::io::copy(&mut limited, &mut out).await?;
                if written > limit {
                    return Err(StorageError::FileTooLarge {
                        name: name.to_string(),
                        limit,
                    });
                }
                written
            }
            None => tokio::io::copy(&mut content, &mut out).await?,
        };

        out.flush().await?;
        out.sync_all().await?;
        Ok(size)
    }

    /// Returns the transfer if `token` is the one issued for `id`.
    pub async fn authorize(&self, id: &str, token: &str) -> Result<Transfer> {
        let transfers = self.transfers.read().await;
        let transfer = transfers
            .get(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        if !tokens_match(token, &transfer.token) {
            return Err(StorageError::Unauthorized);
        }
        Ok(transfer.clone())
    }

    /// Drops the transfer and its files. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.transfers.write().await.remove(id).is_some();
        if removed {
            remove_dir(&self.transfer_dir(id)).await;
            info!(transfer_id = %id, "transfer removed");
        }
        removed
    }

    pub async fn cleanup_older_than(&self, ttl: Duration) -> usize {
        self.evict_older_than(ttl).await.len()
    }

    /// Removes every transfer whose age is at least `ttl` and returns their
    /// IDs. A `ttl` reaching back before the clock's range removes nothing.
    pub async fn evict_older_than(&self, ttl: Duration) -> Vec<String> {
        let now = Utc::now();
        match chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_sub_signed(ttl))
        {
            Some(cutoff) => self.evict_created_before(cutoff).await,
            None => Vec::new(),
        }
    }

    /// Removes every transfer created at or before `cutoff`. The map is swept
    /// in one critical section; directories are deleted afterwards. Anything
    /// inserted with a later `created_at` survives the pass.
    pub async fn evict_created_before(&self, cutoff: DateTime<Utc>) -> Vec<String> {
        let expired: Vec<String> = {
            let mut transfers = self.transfers.write().await;
            let expired: Vec<String> = transfers
                .values()
                .filter(|t| t.created_at <= cutoff)
                .map(|t| t.id.clone())
                .collect();
            for id in &expired {
                transfers.remove(id);
            }
            expired
        };

        for id in &expired {
            remove_dir(&self.transfer_dir(id)).await;
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "expired transfers evicted");
        }
        expired
    }

    pub async fn len(&self) -> usize {
        self.transfers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transfers.read().await.is_empty()
    }
}

async fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir).await
}

async fn create_private_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    options.open(path).await
}

async fn read_head(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).await?;
    let mut head = Vec::with_capacity(MimeDetector::HEAD_LEN);
    file.take(MimeDetector::HEAD_LEN as u64)
        .read_to_end(&mut head)
        .await?;
    Ok(head)
}

async fn remove_dir(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(dir = %dir.display(), error = %e, "failed to remove transfer directory");
        }
    }
}
