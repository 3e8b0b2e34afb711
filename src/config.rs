use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_TRANSFER_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_MAX_DEVICES: usize = 50;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Knobs for the share service as a whole.
#[derive(Debug, Clone)]
pub struct ShareConfig {
    pub uploads_dir: PathBuf,
    pub transfer_ttl: Duration,
    pub cleanup_interval: Duration,
    /// Zero disables the limit.
    pub max_devices: usize,
    pub max_upload_bytes: u64,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            transfer_ttl: DEFAULT_TRANSFER_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            max_devices: DEFAULT_MAX_DEVICES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
