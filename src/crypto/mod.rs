pub mod pin;
pub mod token;

pub use pin::PinSigner;
pub use token::{hash_pin, random_hex, tokens_match};
