//! X25519 key agreement on `x25519-dalek`.
//!
//! Keys exist only in raw form: a 32-byte static secret and a 32-byte
//! Montgomery u-coordinate.

use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::{FacadeError, Result};
use crate::keys::KeyAlgorithm;
use crate::provider::{KeyExchangeCapability, RawKeyPair};

pub const KEY_LEN: usize = 32;

fn key_bytes(bytes: &[u8], what: &str) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let array: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
        FacadeError::InvalidParameter(format!(
            "X25519 {what} must be {KEY_LEN} bytes, got {}",
            bytes.len()
        ))
    })?;
    Ok(Zeroizing::new(array))
}

/// Software X25519.
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519Provider;

impl KeyExchangeCapability for X25519Provider {
    fn name(&self) -> &'static str {
        "X25519"
    }

    fn key_algorithm(&self) -> Option<KeyAlgorithm> {
        None
    }

    fn generate(&self) -> Result<RawKeyPair> {
        let secret = StaticSecret::random_from_rng(rand::thread_rng());
        let public = PublicKey::from(&secret);
        Ok(RawKeyPair {
            private: Zeroizing::new(secret.to_bytes().to_vec()),
            public: public.as_bytes().to_vec(),
        })
    }

    fn derive(&self, private: &[u8], peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let secret = StaticSecret::from(*key_bytes(private, "private key")?);
        let peer = PublicKey::from(*key_bytes(peer_public, "public key")?);
        let shared = secret.diffie_hellman(&peer);
        if !shared.was_contributory() {
            return Err(FacadeError::Provider(
                "X25519 peer key is a low-order point".into(),
            ));
        }
        Ok(Zeroizing::new(shared.as_bytes().to_vec()))
    }
}
