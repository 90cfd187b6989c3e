//! Key material marshaling between raw, DER and PEM forms.
//!
//! Every provider exports and imports keys in a fixed-width raw layout.
//! The marshalers in this module translate that layout to and from the
//! canonical DER structures, so a key produced by one provider can be
//! consumed by any other:
//! - RSA-4096 private (PKCS#1) and public (SubjectPublicKeyInfo)
//! - EC private (SEC1) and public (SubjectPublicKeyInfo) on four curves
//! - Ed25519 private (PKCS#8) and public (SubjectPublicKeyInfo)

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::encoding::asn1::{read_outer_sequence, tag, DerReader};
use crate::encoding::pem::{der_to_pem, pem_to_der_labeled};
use crate::error::{FacadeError, Result};

pub mod ec;
pub mod ed25519;
pub mod rsa;

pub use ec::{EcPrivateKeyMarshaler, EcPrivateParts, EcPublicKeyMarshaler};
pub use ed25519::{Ed25519PrivateKeyMarshaler, Ed25519PublicKeyMarshaler};
pub use rsa::{RsaPrivateKeyMarshaler, RsaPublicKeyMarshaler};

/// DER content bytes of the object identifiers used in key structures.
pub mod oid {
    /// 1.2.840.10045.2.1
    pub const EC_PUBLIC_KEY: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];
    /// 1.2.840.113549.1.1.1
    pub const RSA_ENCRYPTION: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];
    /// 1.3.101.112
    pub const ED25519: &[u8] = &[0x2b, 0x65, 0x70];
    /// 1.2.840.10045.3.1.7
    pub const P256: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];
    /// 1.3.132.0.10
    pub const P256K: &[u8] = &[0x2b, 0x81, 0x04, 0x00, 0x0a];
    /// 1.3.132.0.34
    pub const P384: &[u8] = &[0x2b, 0x81, 0x04, 0x00, 0x22];
    /// 1.3.132.0.35
    pub const P521: &[u8] = &[0x2b, 0x81, 0x04, 0x00, 0x23];
}

/// Supported elliptic curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Curve {
    P256,
    P256k,
    P384,
    P521,
}

impl Curve {
    pub const ALL: [Curve; 4] = [Curve::P256, Curve::P256k, Curve::P384, Curve::P521];

    /// Byte length of one coordinate (and of the private scalar).
    pub fn field_width(self) -> usize {
        match self {
            Curve::P256 | Curve::P256k => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }

    /// Byte length of an uncompressed point `0x04 ‖ X ‖ Y`.
    pub fn point_width(self) -> usize {
        1 + 2 * self.field_width()
    }

    pub fn oid(self) -> &'static [u8] {
        match self {
            Curve::P256 => oid::P256,
            Curve::P256k => oid::P256K,
            Curve::P384 => oid::P384,
            Curve::P521 => oid::P521,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P256k => "P-256K",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }

    pub fn from_oid(content: &[u8]) -> Option<Curve> {
        Curve::ALL.into_iter().find(|c| c.oid() == content)
    }

    /// Accepts NIST and SEC names, with or without dashes.
    pub fn from_name(name: &str) -> Option<Curve> {
        let normalized = name.to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "p256" | "secp256r1" | "prime256v1" => Some(Curve::P256),
            "p256k" | "secp256k1" => Some(Curve::P256k),
            "p384" | "secp384r1" => Some(Curve::P384),
            "p521" | "secp521r1" => Some(Curve::P521),
            _ => None,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key algorithms understood by the marshalers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyAlgorithm {
    Rsa4096,
    Ec(Curve),
    Ed25519,
}

impl KeyAlgorithm {
    pub fn from_name(name: &str) -> Option<KeyAlgorithm> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "rsa" | "rsa4096" => Some(KeyAlgorithm::Rsa4096),
            "ed25519" => Some(KeyAlgorithm::Ed25519),
            _ => Curve::from_name(name).map(KeyAlgorithm::Ec),
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Rsa4096 => f.write_str("RSA-4096"),
            KeyAlgorithm::Ec(curve) => write!(f, "EC {curve}"),
            KeyAlgorithm::Ed25519 => f.write_str("Ed25519"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyKind {
    Private,
    Public,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Private => f.write_str("private"),
            KeyKind::Public => f.write_str("public"),
        }
    }
}

/// The three interchangeable key representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyEncoding {
    Raw,
    Der,
    Pem,
}

/// Translation between one (algorithm, kind) pair's raw layout and its
/// DER and PEM forms.
pub trait KeyMarshaler: Send + Sync {
    fn algorithm(&self) -> KeyAlgorithm;

    fn kind(&self) -> KeyKind;

    /// Exact length of the raw layout.
    fn raw_len(&self) -> usize;

    fn pem_label(&self) -> &'static str;

    fn raw_to_der(&self, raw: &[u8]) -> Result<Vec<u8>>;

    fn der_to_raw(&self, der: &[u8]) -> Result<Vec<u8>>;

    fn raw_to_pem(&self, raw: &[u8]) -> Result<String> {
        Ok(der_to_pem(&self.raw_to_der(raw)?, self.pem_label()))
    }

    fn pem_to_raw(&self, pem: &str) -> Result<Vec<u8>> {
        let (label, der) = pem_to_der_labeled(pem)?;
        if label != self.pem_label() {
            log::debug!(
                "PEM label {label:?} rejected for {} {} key",
                self.algorithm(),
                self.kind()
            );
            return Err(FacadeError::KeyFormatMismatch(format!(
                "expected PEM label {:?}, found {label:?}",
                self.pem_label()
            )));
        }
        self.der_to_raw(&der)
    }
}

/// Fail unless `raw` has exactly the marshaler's raw length.
pub(crate) fn check_raw_len(marshaler: &dyn KeyMarshaler, raw: &[u8]) -> Result<()> {
    if raw.len() == marshaler.raw_len() {
        return Ok(());
    }
    Err(FacadeError::KeyFormatMismatch(format!(
        "{} {} raw key must be {} bytes, got {}",
        marshaler.algorithm(),
        marshaler.kind(),
        marshaler.raw_len(),
        raw.len()
    )))
}

/// Fail unless a decoded OID equals the expected one.
pub(crate) fn expect_oid(found: &[u8], expected: &[u8], what: &str) -> Result<()> {
    if found == expected {
        return Ok(());
    }
    let render = |o: &[u8]| crate::encoding::oid_to_dotted(o).unwrap_or_else(|_| hex_oid(o));
    log::debug!("{what} OID mismatch: found {}", render(found));
    Err(FacadeError::KeyFormatMismatch(format!(
        "{what}: expected OID {}, found {}",
        render(expected),
        render(found)
    )))
}

fn hex_oid(o: &[u8]) -> String {
    o.iter().map(|b| format!("{b:02x}")).collect()
}

/// Marshaler for an (algorithm, kind) pair.
pub fn marshaler_for(algorithm: KeyAlgorithm, kind: KeyKind) -> Box<dyn KeyMarshaler> {
    match (algorithm, kind) {
        (KeyAlgorithm::Rsa4096, KeyKind::Private) => Box::new(RsaPrivateKeyMarshaler),
        (KeyAlgorithm::Rsa4096, KeyKind::Public) => Box::new(RsaPublicKeyMarshaler),
        (KeyAlgorithm::Ec(curve), KeyKind::Private) => Box::new(EcPrivateKeyMarshaler::new(curve)),
        (KeyAlgorithm::Ec(curve), KeyKind::Public) => Box::new(EcPublicKeyMarshaler::new(curve)),
        (KeyAlgorithm::Ed25519, KeyKind::Private) => Box::new(Ed25519PrivateKeyMarshaler),
        (KeyAlgorithm::Ed25519, KeyKind::Public) => Box::new(Ed25519PublicKeyMarshaler),
    }
}

/// Key bytes in any of the three representations.
///
/// The buffer is zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    Raw(Vec<u8>),
    Der(Vec<u8>),
    Pem(String),
}

impl KeyMaterial {
    pub fn encoding(&self) -> KeyEncoding {
        match self {
            KeyMaterial::Raw(_) => KeyEncoding::Raw,
            KeyMaterial::Der(_) => KeyEncoding::Der,
            KeyMaterial::Pem(_) => KeyEncoding::Pem,
        }
    }

    pub fn to_raw(&self, marshaler: &dyn KeyMarshaler) -> Result<Vec<u8>> {
        match self {
            KeyMaterial::Raw(raw) => {
                check_raw_len(marshaler, raw)?;
                Ok(raw.clone())
            }
            KeyMaterial::Der(der) => marshaler.der_to_raw(der),
            KeyMaterial::Pem(pem) => marshaler.pem_to_raw(pem),
        }
    }

    /// Re-express this key in `encoding`, validating it on the way.
    pub fn convert(&self, marshaler: &dyn KeyMarshaler, encoding: KeyEncoding) -> Result<KeyMaterial> {
        let raw = self.to_raw(marshaler)?;
        Ok(match encoding {
            KeyEncoding::Raw => KeyMaterial::Raw(raw),
            KeyEncoding::Der => KeyMaterial::Der(marshaler.raw_to_der(&raw)?),
            KeyEncoding::Pem => KeyMaterial::Pem(marshaler.raw_to_pem(&raw)?),
        })
    }

    /// Wrap a freshly produced raw key in the requested encoding.
    pub fn from_raw(marshaler: &dyn KeyMarshaler, raw: Vec<u8>, encoding: KeyEncoding) -> Result<KeyMaterial> {
        KeyMaterial::Raw(raw).convert(marshaler, encoding)
    }

    /// Bytes of a raw or DER key, or the UTF-8 text of a PEM key.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyMaterial::Raw(b) | KeyMaterial::Der(b) => b,
            KeyMaterial::Pem(s) => s.as_bytes(),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial::{:?}({} bytes)", self.encoding(), self.as_bytes().len())
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        match self {
            KeyMaterial::Raw(b) | KeyMaterial::Der(b) => b.zeroize(),
            KeyMaterial::Pem(s) => s.zeroize(),
        }
    }
}

/// Identify the algorithm and kind of a DER key structure.
pub fn identify_der(der: &[u8]) -> Result<(KeyAlgorithm, KeyKind)> {
    let mut seq = read_outer_sequence(der)?;
    match seq.peek_tag() {
        Some(tag::SEQUENCE) => {
            let mut alg = seq.read_sequence()?;
            let algorithm = algorithm_from_identifier(&mut alg)?;
            Ok((algorithm, KeyKind::Public))
        }
        Some(tag::INTEGER) => {
            let version = seq.read_integer(0)?;
            match (version.as_slice(), seq.peek_tag()) {
                ([0] | [1], Some(tag::SEQUENCE)) => {
                    let mut alg = seq.read_sequence()?;
                    match algorithm_from_identifier(&mut alg)? {
                        KeyAlgorithm::Ed25519 => Ok((KeyAlgorithm::Ed25519, KeyKind::Private)),
                        other => Err(FacadeError::UnsupportedAlgorithm(format!(
                            "PKCS#8 wrapped {other} private keys"
                        ))),
                    }
                }
                ([0], Some(tag::INTEGER)) => Ok((KeyAlgorithm::Rsa4096, KeyKind::Private)),
                ([1], Some(tag::OCTET_STRING)) => {
                    seq.read_octet_string()?;
                    if seq.peek_tag() != Some(tag::context(0)) {
                        return Err(FacadeError::KeyFormatMismatch(
                            "EC private key without curve parameters".into(),
                        ));
                    }
                    let mut params = seq.read_context(0)?;
                    let curve_oid = params.read_oid()?;
                    let curve = Curve::from_oid(curve_oid).ok_or_else(|| unknown_oid("curve", curve_oid))?;
                    Ok((KeyAlgorithm::Ec(curve), KeyKind::Private))
                }
                _ => Err(FacadeError::KeyFormatMismatch(
                    "unrecognized private key structure".into(),
                )),
            }
        }
        Some(other) => Err(FacadeError::MalformedDer(format!(
            "unexpected tag 0x{other:02x} at start of key"
        ))),
        None => Err(FacadeError::MalformedDer("empty key SEQUENCE".into())),
    }
}

/// Identify a PEM key, returning its label as well.
pub fn identify_pem(text: &str) -> Result<(String, KeyAlgorithm, KeyKind)> {
    let (label, der) = pem_to_der_labeled(text)?;
    let (algorithm, kind) = identify_der(&der)?;
    Ok((label, algorithm, kind))
}

fn algorithm_from_identifier(alg: &mut DerReader<'_>) -> Result<KeyAlgorithm> {
    let algorithm_oid = alg.read_oid()?;
    match algorithm_oid {
        oid::RSA_ENCRYPTION => Ok(KeyAlgorithm::Rsa4096),
        oid::ED25519 => Ok(KeyAlgorithm::Ed25519),
        oid::EC_PUBLIC_KEY => {
            let curve_oid = alg.read_oid()?;
            Curve::from_oid(curve_oid)
                .map(KeyAlgorithm::Ec)
                .ok_or_else(|| unknown_oid("curve", curve_oid))
        }
        other => Err(unknown_oid("algorithm", other)),
    }
}

fn unknown_oid(what: &str, content: &[u8]) -> FacadeError {
    let dotted = crate::encoding::oid_to_dotted(content).unwrap_or_else(|_| hex_oid(content));
    FacadeError::UnsupportedAlgorithm(format!("{what} OID {dotted}"))
}
