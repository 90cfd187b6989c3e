//! Crypto facade: provider-neutral key, signature and cipher formats.
//!
//! Keys, signatures and ciphertexts produced through one provider are
//! byte-identical to, and consumable by, any other. The crate provides
//! the format layer every provider must agree on:
//!
//! - ASN.1 DER and PEM codecs ([`encoding`])
//! - raw/DER/PEM key marshaling for RSA-4096, EC and Ed25519 ([`keys`])
//! - ECDSA DER ↔ `R ‖ S` conversion ([`signature`])
//! - a chunk-size-independent streaming block cipher adapter ([`cipher`])
//! - HKDF and PBKDF2 over an injectable keyed hash ([`kdf`])
//!
//! plus the capability traits providers implement ([`provider`]), software
//! reference engines, and caller-facing facades ([`facade`]).

pub mod cipher;
pub mod encoding;
pub mod error;
pub mod facade;
pub mod kdf;
pub mod keys;
pub mod provider;
pub mod signature;

pub use error::{FacadeError, Result};

// Re-export codec entry points
pub use encoding::{der_to_pem, is_valid_label, pem_to_der, pem_to_der_labeled};
pub use keys::{
    identify_der, identify_pem, marshaler_for, Curve, KeyAlgorithm, KeyEncoding, KeyKind,
    KeyMarshaler, KeyMaterial,
};
pub use signature::{der_to_fixed, fixed_to_der, EcdsaSignature};

// Re-export streaming and KDF types
pub use cipher::{BlockTransform, Direction, StreamState, StreamingBlockCipher};
pub use kdf::{hkdf, pbkdf2, HmacSha256, HmacSha384, HmacSha512, KeyedHash, SymmetricMaterial};

// Re-export providers and facades
pub use facade::{
    AsymmetricCipherFacade, CipherFacade, CipherStream, KeyAgreementFacade, KeyPair,
    SignatureEncoding, SignatureFacade,
};
pub use provider::{Capability, CapabilityKind};
