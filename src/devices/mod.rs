pub mod registry;

pub use registry::{DeviceRegistry, MAX_NAME_LEN};
