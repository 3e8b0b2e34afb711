use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lan_share::config::{DEFAULT_MAX_DEVICES, DEFAULT_UPLOADS_DIR};
use lan_share::ShareConfig;
use rocket::data::{ByteUnit, Limits};
use rocket::figment::Figment;

const MIB: u64 = 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "share_server")]
#[command(about = "Share files with devices on the local network", long_about = None)]
pub struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    pub address: IpAddr,

    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Directory holding one sub-directory per live transfer
    #[arg(long, default_value = DEFAULT_UPLOADS_DIR)]
    pub uploads_dir: PathBuf,

    /// How long a transfer stays downloadable
    #[arg(long, default_value_t = 120)]
    pub ttl_minutes: u64,

    #[arg(long, default_value_t = 15)]
    pub cleanup_interval_minutes: u64,

    /// Zero allows any number of devices
    #[arg(long, default_value_t = DEFAULT_MAX_DEVICES)]
    pub max_devices: usize,

    /// Largest single file accepted, in MiB
    #[arg(long, default_value_t = 25)]
    pub max_upload_mb: u64,

    /// Largest whole upload request, in MiB
    #[arg(long, default_value_t = 100)]
    pub max_form_mb: u64,
}

impl Args {
    pub fn share_config(&self) -> ShareConfig {
        ShareConfig {
            uploads_dir: self.uploads_dir.clone(),
            transfer_ttl: Duration::from_secs(self.ttl_minutes.saturating_mul(60)),
            cleanup_interval: Duration::from_secs(self.cleanup_interval_minutes.saturating_mul(60)),
            max_devices: self.max_devices,
            max_upload_bytes: self.max_upload_mb.saturating_mul(MIB),
        }
    }

    /// Rocket's own configuration sources, overridden by the command line.
    pub fn figment(&self) -> Figment {
        let limits = Limits::default()
            .limit("file", ByteUnit::from(self.max_upload_mb.saturating_mul(MIB)))
            .limit("data-form", ByteUnit::from(self.max_form_mb.saturating_mul(MIB)));

        rocket::Config::figment()
            .merge(("address", self.address))
            .merge(("port", self.port))
            .merge(("limits", limits))
    }
}
