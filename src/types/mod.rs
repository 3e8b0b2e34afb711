mod category;
mod device;
mod file;
mod transfer;

pub use category::Category;
pub use device::{Device, PendingFile, PendingTransfer};
pub use file::{FilePayload, MimeDetector, DEFAULT_MIME};
pub use transfer::{StoredFile, Transfer};
