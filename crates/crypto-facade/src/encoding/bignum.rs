//! Unsigned big-number handling for ASN.1 INTEGER fields.
//!
//! Key and signature fields are logically unsigned, fixed-width
//! big-endian values. DER wants the minimal two's-complement form, so
//! leading zeros are stripped and a single 0x00 guard byte is prepended
//! whenever the remaining high bit is set.

use crate::encoding::asn1::{encode_tag, tag};
use crate::error::{FacadeError, Result};

/// Return the minimal big-endian form of an unsigned value, without the
/// sign guard. An all-zero (or empty) input yields a single 0x00 byte.
pub fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b != 0) {
        Some(first) => &bytes[first..],
        None if bytes.is_empty() => &[0],
        None => &bytes[bytes.len() - 1..],
    }
}

/// Encode an unsigned big-endian value as a complete DER INTEGER.
pub fn encode_big_number(bytes: &[u8]) -> Vec<u8> {
    encode_tag(tag::INTEGER, strip_leading_zeros(bytes), true)
}

/// Decode the content bytes of an INTEGER back into an unsigned value.
///
/// With `target_width == 0` the sign guard (if any) is removed and the
/// minimal value returned. Otherwise redundant leading zeros are removed
/// and the value is left-padded with zeros to exactly `target_width`
/// bytes; a value that still does not fit is a [`FacadeError::KeyFormatMismatch`].
pub fn decode_big_number(content: &[u8], target_width: usize) -> Result<Vec<u8>> {
    let Some(&first) = content.first() else {
        return Err(FacadeError::MalformedDer("empty INTEGER".into()));
    };
    if first & 0x80 != 0 {
        return Err(FacadeError::MalformedDer(
            "negative INTEGER where an unsigned value was expected".into(),
        ));
    }

    if target_width == 0 {
        if first == 0 && content.len() > 1 {
            return Ok(content[1..].to_vec());
        }
        return Ok(content.to_vec());
    }

    let mut value = content;
    while value.len() > target_width && value[0] == 0 {
        value = &value[1..];
    }
    if value.len() > target_width {
        return Err(FacadeError::KeyFormatMismatch(format!(
            "field of {} bytes exceeds fixed width {target_width}",
            value.len()
        )));
    }

    let mut out = vec![0u8; target_width - value.len()];
    out.extend_from_slice(value);
    Ok(out)
}
