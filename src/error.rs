use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transfer not found: {0}")]
    NotFound(String),
    #[error("Invalid access token")]
    Unauthorized,
    #[error("No files provided")]
    EmptyUpload,
    #[error("File {name} exceeds the {limit} byte limit")]
    FileTooLarge { name: String, limit: u64 },
    #[error("Transfer directory already exists: {0}")]
    Collision(String),
    #[error("Secure random source failed")]
    Random,
}

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device not found: {0}")]
    NotFound(String),
    #[error("Device name cannot be empty")]
    EmptyName,
    #[error("Device registry is full ({0} devices)")]
    RegistryFull(usize),
    #[error("Secure random source failed")]
    Random,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

pub type Result<T, E = StorageError> = std::result::Result<T, E>;
