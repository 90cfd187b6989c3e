//! Ed25519 signing engine on `ed25519-dalek`.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroizing;

use crate::error::{FacadeError, Result};
use crate::keys::ed25519::KEY_LEN;
use crate::keys::KeyAlgorithm;
use crate::provider::{RawKeyPair, SigningCapability};

pub const SIGNATURE_LEN: usize = 64;

fn signing_key(private: &[u8]) -> Result<SigningKey> {
    let seed: Zeroizing<[u8; KEY_LEN]> = Zeroizing::new(private.try_into().map_err(|_| {
        FacadeError::InvalidParameter(format!(
            "Ed25519 private key must be {KEY_LEN} bytes, got {}",
            private.len()
        ))
    })?);
    Ok(SigningKey::from_bytes(&seed))
}

fn verifying_key(public: &[u8]) -> Result<VerifyingKey> {
    let bytes: [u8; KEY_LEN] = public.try_into().map_err(|_| {
        FacadeError::InvalidParameter(format!(
            "Ed25519 public key must be {KEY_LEN} bytes, got {}",
            public.len()
        ))
    })?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| FacadeError::Provider(format!("invalid Ed25519 public key: {e}")))
}

/// Software Ed25519.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

impl SigningCapability for Ed25519Provider {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Ed25519
    }

    fn generate(&self) -> Result<RawKeyPair> {
        let key = SigningKey::generate(&mut rand::thread_rng());
        Ok(RawKeyPair {
            private: Zeroizing::new(key.to_bytes().to_vec()),
            public: key.verifying_key().to_bytes().to_vec(),
        })
    }

    fn sign_raw(&self, private: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        let key = signing_key(private)?;
        Ok(key.sign(message).to_bytes().to_vec())
    }

    fn verify_raw(&self, public: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
        let key = verifying_key(public)?;
        let signature = Signature::from_slice(signature).map_err(|_| {
            FacadeError::InvalidParameter(format!(
                "Ed25519 signature must be {SIGNATURE_LEN} bytes, got {}",
                signature.len()
            ))
        })?;
        Ok(key.verify(message, &signature).is_ok())
    }
}
