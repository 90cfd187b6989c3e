//! ECDSA signature re-encoding between DER and fixed-width `R ‖ S`.
//!
//! Providers disagree on signature format: some emit
//! `SEQUENCE { INTEGER r, INTEGER s }`, others the concatenation of two
//! field-width integers. Both carry the same (R, S) pair.

use crate::encoding::asn1::{encode_sequence, read_outer_sequence};
use crate::encoding::bignum::encode_big_number;
use crate::error::{FacadeError, Result};

/// Field widths of the supported curves.
const FIELD_WIDTHS: [usize; 3] = [32, 48, 66];

/// Largest DER length for each supported field width.
const DER_LENGTH_THRESHOLDS: [(usize, usize); 3] = [(72, 32), (104, 48), (142, 66)];

/// Field width implied by the length of a DER signature.
pub fn field_width_for_der_len(len: usize) -> Result<usize> {
    DER_LENGTH_THRESHOLDS
        .iter()
        .find(|(max, _)| len <= *max)
        .map(|&(_, width)| width)
        .ok_or(FacadeError::SignatureLengthUnsupported(len))
}

/// Field width implied by the length of an `R ‖ S` signature.
pub fn field_width_for_fixed_len(len: usize) -> Result<usize> {
    match len {
        64 => Ok(32),
        96 => Ok(48),
        132 => Ok(66),
        _ => Err(FacadeError::SignatureLengthUnsupported(len)),
    }
}

/// An ECDSA (R, S) pair, each field-width bytes long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaSignature {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

impl EcdsaSignature {
    /// Decode DER, padding each integer to `field_width` bytes.
    ///
    /// `None` infers the width from the DER length.
    pub fn from_der(der: &[u8], field_width: Option<usize>) -> Result<Self> {
        let width = match field_width {
            Some(width) if FIELD_WIDTHS.contains(&width) => width,
            Some(width) => {
                return Err(FacadeError::InvalidParameter(format!(
                    "field width {width} is not one of {FIELD_WIDTHS:?}"
                )))
            }
            None => field_width_for_der_len(der.len())?,
        };
        log::debug!("decoding {}-byte DER signature at field width {width}", der.len());

        let mut seq = read_outer_sequence(der)?;
        let r = seq.read_integer(width)?;
        let s = seq.read_integer(width)?;
        seq.finish()?;
        Ok(Self { r, s })
    }

    pub fn from_fixed(bin: &[u8]) -> Result<Self> {
        let width = field_width_for_fixed_len(bin.len())?;
        let (r, s) = bin.split_at(width);
        Ok(Self {
            r: r.to_vec(),
            s: s.to_vec(),
        })
    }

    /// Canonical DER encoding.
    pub fn to_der(&self) -> Vec<u8> {
        encode_sequence(&[&encode_big_number(&self.r), &encode_big_number(&self.s)])
    }

    pub fn to_fixed(&self) -> Vec<u8> {
        [self.r.as_slice(), self.s.as_slice()].concat()
    }
}

/// DER signature to `R ‖ S`.
pub fn der_to_fixed(der: &[u8], field_width: Option<usize>) -> Result<Vec<u8>> {
    EcdsaSignature::from_der(der, field_width).map(|sig| sig.to_fixed())
}

/// `R ‖ S` signature to canonical DER.
pub fn fixed_to_der(bin: &[u8]) -> Result<Vec<u8>> {
    EcdsaSignature::from_fixed(bin).map(|sig| sig.to_der())
}
