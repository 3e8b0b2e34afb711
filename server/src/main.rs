use std::sync::Arc;

use clap::Parser;
use lan_share::notify::spawn_cleanup;
use lan_share::{DeviceRegistry, TransferStore};
use server::config::Args;
use server::AppState;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.share_config();

    let store = TransferStore::new(&config.uploads_dir)
        .await?
        .with_max_file_size(config.max_upload_bytes);
    let store = Arc::new(store);
    let registry = Arc::new(DeviceRegistry::new(config.max_devices));

    let cleanup = spawn_cleanup(
        Arc::clone(&store),
        Arc::clone(&registry),
        config.transfer_ttl,
        config.cleanup_interval,
        CancellationToken::new(),
    );

    let state = AppState::new(store, registry)?;
    info!(address = %args.address, port = args.port, "share server starting");

    let launched = server::build(state, args.figment()).launch().await;
    cleanup.shutdown().await;
    launched.map_err(|e| anyhow::anyhow!("server failed: {}", e))?;

    Ok(())
}
