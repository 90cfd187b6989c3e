//! Ed25519 key marshaling (RFC 8410).
//!
//! Private keys use PKCS#8 with the 32-byte seed wrapped in a nested
//! OCTET STRING; public keys use SubjectPublicKeyInfo with the 32-byte
//! point in the BIT STRING.

use crate::encoding::asn1::{
    encode_bit_string, encode_octet_string, encode_oid, encode_sequence, read_outer_sequence, tag,
    DerReader,
};
use crate::encoding::bignum::encode_big_number;
use crate::encoding::pem::label;
use crate::error::{FacadeError, Result};
use crate::keys::{check_raw_len, expect_oid, oid, KeyAlgorithm, KeyKind, KeyMarshaler};

pub const KEY_LEN: usize = 32;

/// OneAsymmetricKey `[1] IMPLICIT` public key, primitive form.
const PKCS8_PUBLIC_KEY_TAG: u8 = 0x81;

fn algorithm_identifier() -> Vec<u8> {
    encode_sequence(&[&encode_oid(oid::ED25519)])
}

fn read_algorithm_identifier(seq: &mut DerReader<'_>) -> Result<()> {
    let mut algorithm = seq.read_sequence()?;
    expect_oid(algorithm.read_oid()?, oid::ED25519, "Ed25519 algorithm")?;
    algorithm.finish()
}

fn check_key_len(key: &[u8], what: &str) -> Result<()> {
    if key.len() != KEY_LEN {
        return Err(FacadeError::KeyFormatMismatch(format!(
            "Ed25519 {what} key is {} bytes, expected {KEY_LEN}",
            key.len()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519PrivateKeyMarshaler;

impl KeyMarshaler for Ed25519PrivateKeyMarshaler {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Ed25519
    }

    fn kind(&self) -> KeyKind {
        KeyKind::Private
    }

    fn raw_len(&self) -> usize {
        KEY_LEN
    }

    fn pem_label(&self) -> &'static str {
        label::PRIVATE_KEY
    }

    fn raw_to_der(&self, raw: &[u8]) -> Result<Vec<u8>> {
        check_raw_len(self, raw)?;
        Ok(encode_sequence(&[
            &encode_big_number(&[0]),
            &algorithm_identifier(),
            &encode_octet_string(&encode_octet_string(raw)),
        ]))
    }

    fn der_to_raw(&self, der: &[u8]) -> Result<Vec<u8>> {
        let mut seq = read_outer_sequence(der)?;
        let version = seq.read_integer(0)?;
        if version != [0] && version != [1] {
            return Err(FacadeError::KeyFormatMismatch(format!(
                "PKCS#8 version {version:?}"
            )));
        }
        read_algorithm_identifier(&mut seq)?;

        let wrapped = seq.read_octet_string()?;
        let mut inner = DerReader::new(wrapped);
        let seed = inner.read_octet_string()?;
        inner.finish()?;
        check_key_len(seed, "private")?;

        // Optional attributes and (v2) public key are not part of the raw form.
        if seq.peek_tag() == Some(tag::context(0)) {
            seq.read_context(0)?;
        }
        if seq.peek_tag() == Some(PKCS8_PUBLIC_KEY_TAG) {
            seq.decode_tag(PKCS8_PUBLIC_KEY_TAG, false)?;
        }
        seq.finish()?;
        Ok(seed.to_vec())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519PublicKeyMarshaler;

impl KeyMarshaler for Ed25519PublicKeyMarshaler {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Ed25519
    }

    fn kind(&self) -> KeyKind {
        KeyKind::Public
    }

    fn raw_len(&self) -> usize {
        KEY_LEN
    }

    fn pem_label(&self) -> &'static str {
        label::PUBLIC_KEY
    }

    fn raw_to_der(&self, raw: &[u8]) -> Result<Vec<u8>> {
        check_raw_len(self, raw)?;
        Ok(encode_sequence(&[&algorithm_identifier(), &encode_bit_string(raw)]))
    }

    fn der_to_raw(&self, der: &[u8]) -> Result<Vec<u8>> {
        let mut seq = read_outer_sequence(der)?;
        read_algorithm_identifier(&mut seq)?;
        let point = seq.read_bit_string()?;
        seq.finish()?;
        check_key_len(point, "public")?;
        Ok(point.to_vec())
    }
}
