//! EC key marshaling (SEC1 private keys, SubjectPublicKeyInfo public keys).
//!
//! ```text
//! ECPrivateKey ::= SEQUENCE {
//!     version        INTEGER (1),
//!     privateKey     OCTET STRING,            -- d, field width
//!     parameters [0] EXPLICIT OBJECT IDENTIFIER,
//!     publicKey  [1] EXPLICIT BIT STRING OPTIONAL }
//!
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     SEQUENCE { id-ecPublicKey, namedCurve },
//!     BIT STRING }                            -- 0x04 ‖ X ‖ Y
//! ```

use crate::encoding::asn1::{
    encode_bit_string, encode_context, encode_octet_string, encode_oid, encode_sequence,
    read_outer_sequence, tag,
};
use crate::encoding::bignum::encode_big_number;
use crate::encoding::pem::label;
use crate::error::{FacadeError, Result};
use crate::keys::{check_raw_len, expect_oid, oid, Curve, KeyAlgorithm, KeyKind, KeyMarshaler};

const EC_PRIVATE_KEY_VERSION: u8 = 1;
const UNCOMPRESSED_POINT: u8 = 0x04;

fn check_point(curve: Curve, point: &[u8]) -> Result<()> {
    if point.len() != curve.point_width() || point[0] != UNCOMPRESSED_POINT {
        return Err(FacadeError::KeyFormatMismatch(format!(
            "{curve} public point must be {} bytes starting with 0x04",
            curve.point_width()
        )));
    }
    Ok(())
}

/// Private scalar plus the public point when the encoding carried one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcPrivateParts {
    pub d: Vec<u8>,
    pub public_point: Option<Vec<u8>>,
}

/// EC private keys; raw layout is the `field_width`-byte scalar `d`.
#[derive(Debug, Clone, Copy)]
pub struct EcPrivateKeyMarshaler {
    curve: Curve,
}

impl EcPrivateKeyMarshaler {
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Encode `d` and, if known, the matching public point.
    pub fn parts_to_der(&self, d: &[u8], public_point: Option<&[u8]>) -> Result<Vec<u8>> {
        check_raw_len(self, d)?;
        let version = encode_big_number(&[EC_PRIVATE_KEY_VERSION]);
        let scalar = encode_octet_string(d);
        let params = encode_context(0, &encode_oid(self.curve.oid()));

        match public_point {
            Some(point) => {
                check_point(self.curve, point)?;
                let public = encode_context(1, &encode_bit_string(point));
                Ok(encode_sequence(&[&version, &scalar, &params, &public]))
            }
            None => Ok(encode_sequence(&[&version, &scalar, &params])),
        }
    }

    /// Decode a SEC1 private key, keeping the optional public point.
    pub fn der_to_parts(&self, der: &[u8]) -> Result<EcPrivateParts> {
        let width = self.curve.field_width();
        let mut seq = read_outer_sequence(der)?;

        let version = seq.read_integer(0)?;
        if version != [EC_PRIVATE_KEY_VERSION] {
            return Err(FacadeError::KeyFormatMismatch(format!(
                "EC private key version {version:?}, expected 1"
            )));
        }

        let scalar = seq.read_octet_string()?;
        if scalar.len() > width {
            return Err(FacadeError::KeyFormatMismatch(format!(
                "{} private scalar is {} bytes, field width is {width}",
                self.curve,
                scalar.len()
            )));
        }
        let mut d = vec![0u8; width - scalar.len()];
        d.extend_from_slice(scalar);

        if seq.peek_tag() != Some(tag::context(0)) {
            log::debug!("{} private key has no curve parameters", self.curve);
            return Err(FacadeError::KeyFormatMismatch(
                "EC private key is missing its [0] curve OID".into(),
            ));
        }
        let mut params = seq.read_context(0)?;
        expect_oid(params.read_oid()?, self.curve.oid(), "EC curve")?;
        params.finish()?;

        let mut public_point = None;
        if seq.peek_tag() == Some(tag::context(1)) {
            let mut public = seq.read_context(1)?;
            let point = public.read_bit_string()?;
            public.finish()?;
            check_point(self.curve, point)?;
            public_point = Some(point.to_vec());
        }

        seq.finish()?;
        Ok(EcPrivateParts { d, public_point })
    }
}

impl KeyMarshaler for EcPrivateKeyMarshaler {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Ec(self.curve)
    }

    fn kind(&self) -> KeyKind {
        KeyKind::Private
    }

    fn raw_len(&self) -> usize {
        self.curve.field_width()
    }

    fn pem_label(&self) -> &'static str {
        label::EC_PRIVATE_KEY
    }

    fn raw_to_der(&self, raw: &[u8]) -> Result<Vec<u8>> {
        self.parts_to_der(raw, None)
    }

    fn der_to_raw(&self, der: &[u8]) -> Result<Vec<u8>> {
        self.der_to_parts(der).map(|parts| parts.d)
    }
}

/// EC public keys; raw layout is the uncompressed point `0x04 ‖ X ‖ Y`.
#[derive(Debug, Clone, Copy)]
pub struct EcPublicKeyMarshaler {
    curve: Curve,
}

impl EcPublicKeyMarshaler {
    pub fn new(curve: Curve) -> Self {
        Self { curve }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }
}

impl KeyMarshaler for EcPublicKeyMarshaler {
    fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Ec(self.curve)
    }

    fn kind(&self) -> KeyKind {
        KeyKind::Public
    }

    fn raw_len(&self) -> usize {
        self.curve.point_width()
    }

    fn pem_label(&self) -> &'static str {
        label::PUBLIC_KEY
    }

    fn raw_to_der(&self, raw: &[u8]) -> Result<Vec<u8>> {
        check_raw_len(self, raw)?;
        check_point(self.curve, raw)?;
        let algorithm = encode_sequence(&[
            &encode_oid(oid::EC_PUBLIC_KEY),
            &encode_oid(self.curve.oid()),
        ]);
        Ok(encode_sequence(&[&algorithm, &encode_bit_string(raw)]))
    }

    fn der_to_raw(&self, der: &[u8]) -> Result<Vec<u8>> {
        let mut seq = read_outer_sequence(der)?;
        let mut algorithm = seq.read_sequence()?;
        expect_oid(algorithm.read_oid()?, oid::EC_PUBLIC_KEY, "EC public key algorithm")?;
        expect_oid(algorithm.read_oid()?, self.curve.oid(), "EC curve")?;
        algorithm.finish()?;

        let point = seq.read_bit_string()?;
        seq.finish()?;
        check_point(self.curve, point)?;
        Ok(point.to_vec())
    }
}
