pub mod config;
pub mod crypto;
pub mod devices;
pub mod error;
pub mod notify;
pub mod storage;

mod types;

pub use config::ShareConfig;
pub use crypto::hash_pin;
pub use devices::DeviceRegistry;
pub use error::{AppError, DeviceError, Result, StorageError};
pub use storage::TransferStore;
pub use types::*;
