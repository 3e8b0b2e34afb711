pub mod sanitize;
pub mod store;

pub use store::TransferStore;
