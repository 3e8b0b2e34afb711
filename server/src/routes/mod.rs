pub mod devices;
pub mod transfers;
