//! Caller-facing facades over the provider capabilities.
//!
//! Each facade owns one capability object and translates between the
//! caller's key material (raw, DER or PEM) and the provider's raw layout,
//! then normalises the provider's output (ECDSA `R ‖ S` versus DER,
//! whole-block transforms versus streaming) back to the caller's format.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::cipher::{decrypt_all, encrypt_all, BlockTransform, StreamingBlockCipher};
use crate::error::{FacadeError, Result};
use crate::kdf::{derive_key_iv, HmacSha256, KeyedHash, SymmetricMaterial};
use crate::keys::{marshaler_for, KeyAlgorithm, KeyEncoding, KeyKind, KeyMarshaler, KeyMaterial};
use crate::provider::{
    AsymmetricCipherCapability, Capability, KeyExchangeCapability, RawKeyPair, SigningCapability,
    SymmetricCapability,
};
use crate::signature::{der_to_fixed, fixed_to_der};

/// Streaming cipher over a provider's boxed block transform.
pub type CipherStream = StreamingBlockCipher<Box<dyn BlockTransform>>;

/// Signature serialisation presented to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureEncoding {
    /// Provider-native bytes: `R ‖ S` for ECDSA, 64 bytes for Ed25519.
    Raw,
    /// `SEQUENCE { INTEGER r, INTEGER s }`, ECDSA only.
    Der,
}

/// A key pair in the caller's chosen encoding.
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub private: KeyMaterial,
    pub public: KeyMaterial,
}

fn wrap_pair(pair: RawKeyPair, algorithm: KeyAlgorithm, encoding: KeyEncoding) -> Result<KeyPair> {
    let private = marshaler_for(algorithm, KeyKind::Private);
    let public = marshaler_for(algorithm, KeyKind::Public);
    Ok(KeyPair {
        private: KeyMaterial::from_raw(&*private, pair.private.to_vec(), encoding)?,
        public: KeyMaterial::from_raw(&*public, pair.public, encoding)?,
    })
}

fn raw_key(material: &KeyMaterial, marshaler: &dyn KeyMarshaler) -> Result<Zeroizing<Vec<u8>>> {
    material.to_raw(marshaler).map(Zeroizing::new)
}

/// Sign and verify through a [`SigningCapability`].
pub struct SignatureFacade {
    engine: Box<dyn SigningCapability>,
    private: Box<dyn KeyMarshaler>,
    public: Box<dyn KeyMarshaler>,
}

impl SignatureFacade {
    pub fn new(engine: Box<dyn SigningCapability>) -> Self {
        let algorithm = engine.algorithm();
        Self {
            private: marshaler_for(algorithm, KeyKind::Private),
            public: marshaler_for(algorithm, KeyKind::Public),
            engine,
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.engine.algorithm()
    }

    pub fn generate(&self, encoding: KeyEncoding) -> Result<KeyPair> {
        wrap_pair(self.engine.generate()?, self.algorithm(), encoding)
    }

    pub fn sign(
        &self,
        private: &KeyMaterial,
        message: &[u8],
        encoding: SignatureEncoding,
    ) -> Result<Vec<u8>> {
        let raw = raw_key(private, &*self.private)?;
        let signature = self.engine.sign_raw(&raw, message)?;
        match (self.algorithm(), encoding) {
            (_, SignatureEncoding::Raw) => Ok(signature),
            (KeyAlgorithm::Ec(_), SignatureEncoding::Der) => fixed_to_der(&signature),
            (other, SignatureEncoding::Der) => Err(FacadeError::UnsupportedAlgorithm(format!(
                "DER signatures are ECDSA only, not {other}"
            ))),
        }
    }

    /// `Ok(false)` for a well-formed signature that does not match.
    pub fn verify(
        &self,
        public: &KeyMaterial,
        message: &[u8],
        signature: &[u8],
        encoding: SignatureEncoding,
    ) -> Result<bool> {
        let raw = public.to_raw(&*self.public)?;
        let signature = match (self.algorithm(), encoding) {
            (_, SignatureEncoding::Raw) => signature.to_vec(),
            (KeyAlgorithm::Ec(curve), SignatureEncoding::Der) => {
                der_to_fixed(signature, Some(curve.field_width()))?
            }
            (other, SignatureEncoding::Der) => {
                return Err(FacadeError::UnsupportedAlgorithm(format!(
                    "DER signatures are ECDSA only, not {other}"
                )))
            }
        };
        let ok = self.engine.verify_raw(&raw, message, &signature)?;
        log::debug!("{} signature verification: {ok}", self.algorithm());
        Ok(ok)
    }
}

impl TryFrom<Capability> for SignatureFacade {
    type Error = FacadeError;

    fn try_from(capability: Capability) -> Result<Self> {
        Ok(Self::new(capability.into_signing()?))
    }
}

/// Streaming symmetric encryption through a [`SymmetricCapability`].
///
/// One-shot `encrypt`/`decrypt` always use PKCS#7 padding; the streaming
/// adapters let the caller choose at `finalize`.
pub struct CipherFacade {
    engine: Box<dyn SymmetricCapability>,
}

impl CipherFacade {
    pub fn new(engine: Box<dyn SymmetricCapability>) -> Self {
        Self { engine }
    }

    pub fn name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn key_len(&self) -> usize {
        self.engine.key_len()
    }

    pub fn iv_len(&self) -> usize {
        self.engine.iv_len()
    }

    pub fn encryptor(&self, key: &[u8], iv: &[u8]) -> Result<CipherStream> {
        Ok(StreamingBlockCipher::encryptor(self.engine.block_encryptor(key, iv)?))
    }

    pub fn decryptor(&self, key: &[u8], iv: &[u8]) -> Result<CipherStream> {
        Ok(StreamingBlockCipher::decryptor(self.engine.block_decryptor(key, iv)?))
    }

    pub fn encrypt(&self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        encrypt_all(self.engine.block_encryptor(key, iv)?, plaintext, true)
    }

    pub fn decrypt(&self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        decrypt_all(self.engine.block_decryptor(key, iv)?, ciphertext, true)
    }

    /// Encrypt with key and IV taken from a KDF output.
    pub fn encrypt_with(&self, material: &SymmetricMaterial, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encrypt(&material.key, &material.iv, plaintext)
    }

    pub fn decrypt_with(&self, material: &SymmetricMaterial, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt(&material.key, &material.iv, ciphertext)
    }
}

impl TryFrom<Capability> for CipherFacade {
    type Error = FacadeError;

    fn try_from(capability: Capability) -> Result<Self> {
        Ok(Self::new(capability.into_symmetric()?))
    }
}

/// Public-key encryption through an [`AsymmetricCipherCapability`].
pub struct AsymmetricCipherFacade {
    engine: Box<dyn AsymmetricCipherCapability>,
    private: Box<dyn KeyMarshaler>,
    public: Box<dyn KeyMarshaler>,
}

impl AsymmetricCipherFacade {
    pub fn new(engine: Box<dyn AsymmetricCipherCapability>) -> Self {
        let algorithm = engine.algorithm();
        Self {
            private: marshaler_for(algorithm, KeyKind::Private),
            public: marshaler_for(algorithm, KeyKind::Public),
            engine,
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.engine.algorithm()
    }

    pub fn encrypt(&self, public: &KeyMaterial, plaintext: &[u8]) -> Result<Vec<u8>> {
        let raw = public.to_raw(&*self.public)?;
        self.engine.encrypt_raw(&raw, plaintext)
    }

    pub fn decrypt(&self, private: &KeyMaterial, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let raw = raw_key(private, &*self.private)?;
        self.engine.decrypt_raw(&raw, ciphertext)
    }
}

impl TryFrom<Capability> for AsymmetricCipherFacade {
    type Error = FacadeError;

    fn try_from(capability: Capability) -> Result<Self> {
        Ok(Self::new(capability.into_asymmetric_cipher()?))
    }
}

/// Key agreement through a [`KeyExchangeCapability`], with HKDF to turn
/// the shared secret into symmetric key material.
pub struct KeyAgreementFacade {
    engine: Box<dyn KeyExchangeCapability>,
    hash: Box<dyn KeyedHash>,
}

impl KeyAgreementFacade {
    /// Facade deriving symmetric material with HKDF-SHA256.
    pub fn new(engine: Box<dyn KeyExchangeCapability>) -> Self {
        Self::with_hash(engine, Box::new(HmacSha256))
    }

    pub fn with_hash(engine: Box<dyn KeyExchangeCapability>, hash: Box<dyn KeyedHash>) -> Self {
        Self { engine, hash }
    }

    pub fn name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn generate(&self, encoding: KeyEncoding) -> Result<KeyPair> {
        let pair = self.engine.generate()?;
        match self.engine.key_algorithm() {
            Some(algorithm) => wrap_pair(pair, algorithm, encoding),
            None if encoding == KeyEncoding::Raw => Ok(KeyPair {
                private: KeyMaterial::Raw(pair.private.to_vec()),
                public: KeyMaterial::Raw(pair.public),
            }),
            None => Err(self.raw_only(encoding)),
        }
    }

    fn raw_only(&self, encoding: KeyEncoding) -> FacadeError {
        FacadeError::UnsupportedAlgorithm(format!(
            "{} keys have no {encoding:?} form",
            self.engine.name()
        ))
    }

    fn raw_of(&self, material: &KeyMaterial, kind: KeyKind) -> Result<Zeroizing<Vec<u8>>> {
        match (self.engine.key_algorithm(), material) {
            (Some(algorithm), _) => raw_key(material, &*marshaler_for(algorithm, kind)),
            (None, KeyMaterial::Raw(raw)) => Ok(Zeroizing::new(raw.clone())),
            (None, other) => Err(self.raw_only(other.encoding())),
        }
    }

    pub fn shared_secret(
        &self,
        private: &KeyMaterial,
        peer_public: &KeyMaterial,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let private = self.raw_of(private, KeyKind::Private)?;
        let peer = self.raw_of(peer_public, KeyKind::Public)?;
        self.engine.derive(&private, &peer)
    }

    /// Agree on a shared secret and expand it into key ‖ IV.
    pub fn derive_symmetric(
        &self,
        private: &KeyMaterial,
        peer_public: &KeyMaterial,
        salt: &[u8],
        info: &[u8],
        key_len: usize,
        iv_len: usize,
    ) -> Result<SymmetricMaterial> {
        let shared = self.shared_secret(private, peer_public)?;
        derive_key_iv(&*self.hash, &shared, salt, info, key_len, iv_len)
    }
}

impl TryFrom<Capability> for KeyAgreementFacade {
    type Error = FacadeError;

    fn try_from(capability: Capability) -> Result<Self> {
        Ok(Self::new(capability.into_key_exchange()?))
    }
}
