//! Provider capabilities.
//!
//! A provider is an engine that performs the actual mathematics. The
//! facade talks to it through one of four capability traits, each taking
//! and returning keys in the raw layouts defined by [`crate::keys`]. The
//! engine in use is chosen by the caller at construction time by handing a
//! [`Capability`] (or a boxed trait object) to the matching facade.
//!
//! Bundled software engines:
//! - [`Aes256CbcProvider`]: symmetric, AES-256-CBC
//! - [`Ed25519Provider`]: signing, Ed25519
//! - [`P384Provider`]: signing (ECDSA/SHA-384) and key exchange (ECDH)
//! - [`X25519Provider`]: key exchange, X25519

pub mod aes;
pub mod ed25519;
pub mod p384;
pub mod x25519;

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::cipher::BlockTransform;
use crate::error::{FacadeError, Result};
use crate::keys::KeyAlgorithm;

pub use self::aes::Aes256CbcProvider;
pub use self::ed25519::Ed25519Provider;
pub use self::p384::P384Provider;
pub use self::x25519::X25519Provider;

/// The four kinds of primitive a provider can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityKind {
    Symmetric,
    Sign,
    Encrypt,
    KeyExchange,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapabilityKind::Symmetric => "symmetric",
            CapabilityKind::Sign => "sign",
            CapabilityKind::Encrypt => "encrypt",
            CapabilityKind::KeyExchange => "key-exchange",
        };
        f.write_str(name)
    }
}

/// A freshly generated key pair in raw layouts.
///
/// The private half is zeroized when the pair is dropped.
pub struct RawKeyPair {
    pub private: Zeroizing<Vec<u8>>,
    pub public: Vec<u8>,
}

impl fmt::Debug for RawKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawKeyPair")
            .field("private_len", &self.private.len())
            .field("public_len", &self.public.len())
            .finish()
    }
}

/// Whole-block symmetric cipher.
pub trait SymmetricCapability: Send + Sync {
    fn name(&self) -> &'static str;

    fn key_len(&self) -> usize;

    fn iv_len(&self) -> usize;

    fn block_encryptor(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn BlockTransform>>;

    fn block_decryptor(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn BlockTransform>>;
}

/// Signature generation and verification.
///
/// ECDSA engines produce and accept fixed-width `R ‖ S`; the facade
/// converts to and from DER.
pub trait SigningCapability: Send + Sync {
    fn algorithm(&self) -> KeyAlgorithm;

    fn generate(&self) -> Result<RawKeyPair>;

    fn sign_raw(&self, private: &[u8], message: &[u8]) -> Result<Vec<u8>>;

    /// `Ok(false)` for a well-formed but non-matching signature.
    fn verify_raw(&self, public: &[u8], message: &[u8], signature: &[u8]) -> Result<bool>;
}

/// Public-key encryption.
pub trait AsymmetricCipherCapability: Send + Sync {
    fn algorithm(&self) -> KeyAlgorithm;

    fn encrypt_raw(&self, public: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    fn decrypt_raw(&self, private: &[u8], data: &[u8]) -> Result<Vec<u8>>;
}

/// Diffie-Hellman style key agreement.
pub trait KeyExchangeCapability: Send + Sync {
    fn name(&self) -> &'static str;

    /// Marshaling family for this engine's keys, `None` when keys only
    /// exist in raw form.
    fn key_algorithm(&self) -> Option<KeyAlgorithm>;

    fn generate(&self) -> Result<RawKeyPair>;

    fn derive(&self, private: &[u8], peer_public: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

/// One capability of one provider.
pub enum Capability {
    Symmetric(Box<dyn SymmetricCapability>),
    Sign(Box<dyn SigningCapability>),
    Encrypt(Box<dyn AsymmetricCipherCapability>),
    KeyExchange(Box<dyn KeyExchangeCapability>),
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::Symmetric(_) => CapabilityKind::Symmetric,
            Capability::Sign(_) => CapabilityKind::Sign,
            Capability::Encrypt(_) => CapabilityKind::Encrypt,
            Capability::KeyExchange(_) => CapabilityKind::KeyExchange,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Capability::Symmetric(c) => c.name().to_string(),
            Capability::Sign(c) => c.algorithm().to_string(),
            Capability::Encrypt(c) => c.algorithm().to_string(),
            Capability::KeyExchange(c) => c.name().to_string(),
        }
    }

    fn mismatch(&self, wanted: CapabilityKind) -> FacadeError {
        FacadeError::UnsupportedAlgorithm(format!(
            "{} is a {} capability, not {wanted}",
            self.name(),
            self.kind()
        ))
    }

    pub fn into_symmetric(self) -> Result<Box<dyn SymmetricCapability>> {
        match self {
            Capability::Symmetric(c) => Ok(c),
            other => Err(other.mismatch(CapabilityKind::Symmetric)),
        }
    }

    pub fn into_signing(self) -> Result<Box<dyn SigningCapability>> {
        match self {
            Capability::Sign(c) => Ok(c),
            other => Err(other.mismatch(CapabilityKind::Sign)),
        }
    }

    pub fn into_asymmetric_cipher(self) -> Result<Box<dyn AsymmetricCipherCapability>> {
        match self {
            Capability::Encrypt(c) => Ok(c),
            other => Err(other.mismatch(CapabilityKind::Encrypt)),
        }
    }

    pub fn into_key_exchange(self) -> Result<Box<dyn KeyExchangeCapability>> {
        match self {
            Capability::KeyExchange(c) => Ok(c),
            other => Err(other.mismatch(CapabilityKind::KeyExchange)),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability::{:?}({})", self.kind(), self.name())
    }
}

/// Fail unless `bytes` is exactly `expected` long.
pub(crate) fn check_len(bytes: &[u8], expected: usize, what: &str) -> Result<()> {
    if bytes.len() != expected {
        return Err(FacadeError::InvalidParameter(format!(
            "{what} must be {expected} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(())
}
