use ring::error::Unspecified;
use ring::hmac;
use ring::rand::SystemRandom;

/// Issues and checks proofs that a client entered the right PIN for a
/// transfer.
///
/// The key is generated per process, so every proof is invalidated on
/// restart along with the transfers themselves.
pub struct PinSigner {
    key: hmac::Key,
}

impl PinSigner {
    pub fn new() -> Result<Self, Unspecified> {
        let rng = SystemRandom::new();
        let key = hmac::Key::generate(hmac::HMAC_SHA256, &rng)?;
        Ok(Self { key })
    }

    pub fn cookie_name(transfer_id: &str) -> String {
        format!("pin-{}", transfer_id)
    }

    pub fn sign(&self, pin_hash: &str, transfer_id: &str) -> String {
        let tag = hmac::sign(&self.key, &Self::message(pin_hash, transfer_id));
        hex::encode(tag.as_ref())
    }

    pub fn verify(&self, pin_hash: &str, transfer_id: &str, proof: &str) -> bool {
        let Ok(tag) = hex::decode(proof) else {
            return false;
        };
        hmac::verify(&self.key, &Self::message(pin_hash, transfer_id), &tag).is_ok()
    }

    fn message(pin_hash: &str, transfer_id: &str) -> Vec<u8> {
        let mut msg = Vec::with_capacity(pin_hash.len() + transfer_id.len());
        msg.extend_from_slice(pin_hash.as_bytes());
        msg.extend_from_slice(transfer_id.as_bytes());
        msg
    }
}
