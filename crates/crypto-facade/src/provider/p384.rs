//! NIST P-384 engine on the RustCrypto `p384` crate: ECDSA with SHA-384
//! and ECDH.
//!
//! Raw layouts follow [`crate::keys::ec`]: the private key is the 48-byte
//! scalar, the public key the 97-byte uncompressed point. Signatures are
//! 96-byte `R ‖ S`.

use p384::ecdsa::signature::{Signer, Verifier};
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
use p384::elliptic_curve::sec1::ToEncodedPoint;
use p384::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::{FacadeError, Result};
use crate::keys::{Curve, KeyAlgorithm};
use crate::provider::{check_len, KeyExchangeCapability, RawKeyPair, SigningCapability};

const CURVE: Curve = Curve::P384;

fn secret_key(private: &[u8]) -> Result<SecretKey> {
    check_len(private, CURVE.field_width(), "P-384 private scalar")?;
    SecretKey::from_slice(private)
        .map_err(|_| FacadeError::Provider("P-384 private scalar out of range".into()))
}

fn public_key(public: &[u8]) -> Result<PublicKey> {
    check_len(public, CURVE.point_width(), "P-384 public point")?;
    PublicKey::from_sec1_bytes(public)
        .map_err(|_| FacadeError::Provider("P-384 public point is not on the curve".into()))
}

fn generate_pair() -> RawKeyPair {
    let secret = SecretKey::random(&mut OsRng);
    let public = secret.public_key().to_encoded_point(false);
    RawKeyPair {
        private: Zeroizing::new(secret.to_bytes().to_vec()),
        public: public.as_bytes().to_vec(),
    }
}

/// Software P-384.
#[derive(Debug, Clone, Copy, Default)]
pub struct P384Provider;

impl SigningCapability for P384Provider {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Ec(CURVE)
    }

    fn generate(&self) -> Result<RawKeyPair> {
        Ok(generate_pair())
    }

    fn sign_raw(&self, private: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        let key = SigningKey::from(secret_key(private)?);
        let signature: Signature = key
            .try_sign(message)
            .map_err(|e| FacadeError::Provider(format!("ECDSA P-384 sign: {e}")))?;
        Ok(signature.to_bytes().to_vec())
    }

    fn verify_raw(&self, public: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
        let key = VerifyingKey::from(public_key(public)?);
        check_len(signature, 2 * CURVE.field_width(), "P-384 R || S signature")?;
        let Ok(signature) = Signature::from_slice(signature) else {
            // R or S is zero or not below the group order.
            return Ok(false);
        };
        Ok(key.verify(message, &signature).is_ok())
    }
}

impl KeyExchangeCapability for P384Provider {
    fn name(&self) -> &'static str {
        "ECDH P-384"
    }

    fn key_algorithm(&self) -> Option<KeyAlgorithm> {
        Some(KeyAlgorithm::Ec(CURVE))
    }

    fn generate(&self) -> Result<RawKeyPair> {
        Ok(generate_pair())
    }

    fn derive(&self, private: &[u8], peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let secret = secret_key(private)?;
        let peer = public_key(peer_public)?;
        let shared = p384::ecdh::diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
        Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
    }
}
