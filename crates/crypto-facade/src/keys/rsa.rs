//! RSA-4096 key marshaling.
//!
//! The raw private layout is the CRT form as eight concatenated
//! fixed-width big-endian fields:
//!
//! | field            | bytes |
//! |------------------|-------|
//! | modulus          | 512   |
//! | public exponent  | 4     |
//! | private exponent | 512   |
//! | prime1           | 256   |
//! | prime2           | 256   |
//! | exponent1        | 256   |
//! | exponent2        | 256   |
//! | coefficient      | 256   |
//!
//! The raw public layout is the first two fields (modulus ‖ exponent).

use crate::encoding::asn1::{
    encode_bit_string, encode_null, encode_oid, encode_sequence, read_outer_sequence, DerReader,
};
use crate::encoding::bignum::encode_big_number;
use crate::encoding::pem::label;
use crate::error::{FacadeError, Result};
use crate::keys::{check_raw_len, expect_oid, oid, KeyAlgorithm, KeyKind, KeyMarshaler};

/// Widths of the CRT private key fields, in DER order.
pub const PRIVATE_FIELD_WIDTHS: [usize; 8] = [512, 4, 512, 256, 256, 256, 256, 256];

/// Widths of the public key fields.
pub const PUBLIC_FIELD_WIDTHS: [usize; 2] = [512, 4];

pub const PRIVATE_RAW_LEN: usize = 2308;
pub const PUBLIC_RAW_LEN: usize = 516;

const RSA_PRIVATE_KEY_VERSION: u8 = 0;

/// Split `raw` at the given widths and encode each piece as an INTEGER.
fn encode_fields(raw: &[u8], widths: &[usize]) -> Vec<Vec<u8>> {
    let mut offset = 0;
    widths
        .iter()
        .map(|&w| {
            let field = encode_big_number(&raw[offset..offset + w]);
            offset += w;
            field
        })
        .collect()
}

/// Read one INTEGER per width, each padded to its fixed width.
fn decode_fields(seq: &mut DerReader<'_>, widths: &[usize]) -> Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(widths.iter().sum());
    for &width in widths {
        raw.extend(seq.read_integer(width)?);
    }
    Ok(raw)
}

/// PKCS#1 `RSAPrivateKey` marshaling.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaPrivateKeyMarshaler;

impl RsaPrivateKeyMarshaler {
    /// Public raw layout (modulus ‖ exponent) taken from a private raw key.
    pub fn public_from_private(&self, raw: &[u8]) -> Result<Vec<u8>> {
        check_raw_len(self, raw)?;
        Ok(raw[..PUBLIC_RAW_LEN].to_vec())
    }
}

impl KeyMarshaler for RsaPrivateKeyMarshaler {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Rsa4096
    }

    fn kind(&self) -> KeyKind {
        KeyKind::Private
    }

    fn raw_len(&self) -> usize {
        PRIVATE_RAW_LEN
    }

    fn pem_label(&self) -> &'static str {
        label::RSA_PRIVATE_KEY
    }

    fn raw_to_der(&self, raw: &[u8]) -> Result<Vec<u8>> {
        check_raw_len(self, raw)?;
        let version = encode_big_number(&[RSA_PRIVATE_KEY_VERSION]);
        let fields = encode_fields(raw, &PRIVATE_FIELD_WIDTHS);

        let mut elements: Vec<&[u8]> = Vec::with_capacity(fields.len() + 1);
        elements.push(&version);
        elements.extend(fields.iter().map(Vec::as_slice));
        Ok(encode_sequence(&elements))
    }

    fn der_to_raw(&self, der: &[u8]) -> Result<Vec<u8>> {
        let mut seq = read_outer_sequence(der)?;
        let version = seq.read_integer(0)?;
        if version != [RSA_PRIVATE_KEY_VERSION] {
            return Err(FacadeError::KeyFormatMismatch(format!(
                "RSA private key version {version:?}, only two-prime version 0 is supported"
            )));
        }
        let raw = decode_fields(&mut seq, &PRIVATE_FIELD_WIDTHS)?;
        seq.finish()?;
        Ok(raw)
    }
}

/// SubjectPublicKeyInfo wrapping a PKCS#1 `RSAPublicKey`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaPublicKeyMarshaler;

impl KeyMarshaler for RsaPublicKeyMarshaler {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Rsa4096
    }

    fn kind(&self) -> KeyKind {
        KeyKind::Public
    }

    fn raw_len(&self) -> usize {
        PUBLIC_RAW_LEN
    }

    fn pem_label(&self) -> &'static str {
        label::PUBLIC_KEY
    }

    fn raw_to_der(&self, raw: &[u8]) -> Result<Vec<u8>> {
        check_raw_len(self, raw)?;
        let fields = encode_fields(raw, &PUBLIC_FIELD_WIDTHS);
        let public_key = encode_sequence(&[&fields[0], &fields[1]]);
        let algorithm = encode_sequence(&[&encode_oid(oid::RSA_ENCRYPTION), &encode_null()]);
        Ok(encode_sequence(&[&algorithm, &encode_bit_string(&public_key)]))
    }

    fn der_to_raw(&self, der: &[u8]) -> Result<Vec<u8>> {
        let mut seq = read_outer_sequence(der)?;
        let mut algorithm = seq.read_sequence()?;
        expect_oid(algorithm.read_oid()?, oid::RSA_ENCRYPTION, "RSA public key algorithm")?;
        if !algorithm.is_empty() {
            algorithm.read_null()?;
        }
        algorithm.finish()?;

        let bits = seq.read_bit_string()?;
        seq.finish()?;

        let mut public_key = read_outer_sequence(bits)?;
        let raw = decode_fields(&mut public_key, &PUBLIC_FIELD_WIDTHS)?;
        public_key.finish()?;
        Ok(raw)
    }
}
