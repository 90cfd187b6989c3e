//! Minimal ASN.1 DER tag-length-value codec.
//!
//! Only the handful of universal types needed for key and signature
//! structures are supported: SEQUENCE, INTEGER, OCTET STRING, BIT STRING,
//! OBJECT IDENTIFIER, NULL and constructed context-specific tags.
//!
//! Decoding is all-or-nothing. A tag mismatch, a truncated length or a
//! length running past the end of the buffer aborts the whole decode.

use crate::encoding::bignum::decode_big_number;
use crate::error::{FacadeError, Result};

/// Identifier bytes for the supported ASN.1 types.
pub mod tag {
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;

    /// Constructed context-specific tag `[n]`.
    pub const fn context(n: u8) -> u8 {
        0xA0 | n
    }
}

/// Longest length-of-length accepted on decode.
const MAX_LENGTH_OCTETS: usize = 4;

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let be = len.to_be_bytes();
    let first = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
    let octets = &be[first..];
    out.push(0x80 | octets.len() as u8);
    out.extend_from_slice(octets);
}

/// Write one TLV: identifier byte, short- or long-form length, payload.
///
/// With `pad_big_number` a 0x00 guard byte is inserted in front of a
/// payload whose first byte has the high bit set.
pub fn encode_tag(tag: u8, payload: &[u8], pad_big_number: bool) -> Vec<u8> {
    let guard = pad_big_number && payload.first().is_some_and(|&b| b & 0x80 != 0);
    let len = payload.len() + usize::from(guard);

    let mut out = Vec::with_capacity(len + 2 + MAX_LENGTH_OCTETS);
    out.push(tag);
    encode_length(len, &mut out);
    if guard {
        out.push(0x00);
    }
    out.extend_from_slice(payload);
    out
}

/// SEQUENCE over already-encoded elements.
pub fn encode_sequence(elements: &[&[u8]]) -> Vec<u8> {
    encode_tag(tag::SEQUENCE, &elements.concat(), false)
}

pub fn encode_octet_string(bytes: &[u8]) -> Vec<u8> {
    encode_tag(tag::OCTET_STRING, bytes, false)
}

/// BIT STRING with the "unused bits" byte fixed at zero.
pub fn encode_bit_string(bytes: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(bytes.len() + 1);
    payload.push(0x00);
    payload.extend_from_slice(bytes);
    encode_tag(tag::BIT_STRING, &payload, false)
}

/// OBJECT IDENTIFIER from its pre-encoded content bytes.
pub fn encode_oid(content: &[u8]) -> Vec<u8> {
    encode_tag(tag::OBJECT_IDENTIFIER, content, false)
}

pub fn encode_null() -> Vec<u8> {
    vec![tag::NULL, 0x00]
}

/// Explicitly tagged `[n]` wrapper around one encoded element.
pub fn encode_context(n: u8, inner: &[u8]) -> Vec<u8> {
    encode_tag(tag::context(n), inner, false)
}

/// Cursor over a DER buffer.
///
/// Each `read_*` call consumes exactly one element. Constructed types
/// return a nested reader scoped to their payload.
#[derive(Debug, Clone)]
pub struct DerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Identifier byte of the next element, if any.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(FacadeError::MalformedDer(format!(
                "{what}: need {n} bytes, {} remain",
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_length(&mut self) -> Result<usize> {
        let first = self.take(1, "length")?[0];
        if first < 0x80 {
            return Ok(usize::from(first));
        }
        let octets = usize::from(first & 0x7f);
        if octets == 0 {
            return Err(FacadeError::MalformedDer(
                "indefinite length is not DER".into(),
            ));
        }
        if octets > MAX_LENGTH_OCTETS {
            return Err(FacadeError::MalformedDer(format!(
                "length-of-length {octets} exceeds {MAX_LENGTH_OCTETS}"
            )));
        }
        let len = self
            .take(octets, "long-form length")?
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));
        Ok(len)
    }

    /// Consume one element of type `tag` and return its payload.
    ///
    /// With `strip_guard`, a leading 0x00 sign guard is dropped from a
    /// multi-byte payload.
    pub fn decode_tag(&mut self, tag: u8, strip_guard: bool) -> Result<&'a [u8]> {
        let found = self.take(1, "identifier")?[0];
        if found != tag {
            return Err(FacadeError::MalformedDer(format!(
                "expected tag 0x{tag:02x}, found 0x{found:02x}"
            )));
        }
        let len = self.read_length()?;
        let payload = self.take(len, "payload")?;
        if strip_guard && payload.len() > 1 && payload[0] == 0x00 {
            return Ok(&payload[1..]);
        }
        Ok(payload)
    }

    pub fn read_sequence(&mut self) -> Result<DerReader<'a>> {
        self.decode_tag(tag::SEQUENCE, false).map(DerReader::new)
    }

    /// Explicit `[n]` wrapper; the returned reader spans its contents.
    pub fn read_context(&mut self, n: u8) -> Result<DerReader<'a>> {
        self.decode_tag(tag::context(n), false).map(DerReader::new)
    }

    /// INTEGER decoded as an unsigned value, padded to `width` when non-zero.
    pub fn read_integer(&mut self, width: usize) -> Result<Vec<u8>> {
        let content = self.decode_tag(tag::INTEGER, false)?;
        decode_big_number(content, width)
    }

    pub fn read_octet_string(&mut self) -> Result<&'a [u8]> {
        self.decode_tag(tag::OCTET_STRING, false)
    }

    /// BIT STRING payload with the zero "unused bits" byte removed.
    pub fn read_bit_string(&mut self) -> Result<&'a [u8]> {
        let payload = self.decode_tag(tag::BIT_STRING, false)?;
        match payload.split_first() {
            Some((&0x00, bits)) => Ok(bits),
            Some((unused, _)) => Err(FacadeError::MalformedDer(format!(
                "BIT STRING with {unused} unused bits"
            ))),
            None => Err(FacadeError::MalformedDer("empty BIT STRING".into())),
        }
    }

    pub fn read_oid(&mut self) -> Result<&'a [u8]> {
        self.decode_tag(tag::OBJECT_IDENTIFIER, false)
    }

    pub fn read_null(&mut self) -> Result<()> {
        let payload = self.decode_tag(tag::NULL, false)?;
        if !payload.is_empty() {
            return Err(FacadeError::MalformedDer("NULL with content".into()));
        }
        Ok(())
    }

    /// Fail if anything is left after the last expected element.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FacadeError::MalformedDer(format!(
                "{} trailing bytes",
                self.remaining()
            )))
        }
    }
}

/// Decode a buffer holding exactly one outer SEQUENCE.
pub fn read_outer_sequence(der: &[u8]) -> Result<DerReader<'_>> {
    let mut outer = DerReader::new(der);
    let seq = outer.read_sequence()?;
    outer.finish()?;
    Ok(seq)
}

/// Render OID content bytes in dotted-decimal notation.
pub fn oid_to_dotted(content: &[u8]) -> Result<String> {
    let mut arcs: Vec<u64> = Vec::new();
    let mut value: u64 = 0;
    let mut pending = false;

    for &byte in content {
        value = value
            .checked_mul(128)
            .ok_or_else(|| FacadeError::MalformedDer("OID arc overflows u64".into()))?
            | u64::from(byte & 0x7f);
        pending = true;
        if byte & 0x80 != 0 {
            continue;
        }
        if arcs.is_empty() {
            let first = (value / 40).min(2);
            arcs.push(first);
            arcs.push(value - first * 40);
        } else {
            arcs.push(value);
        }
        value = 0;
        pending = false;
    }

    if pending || arcs.is_empty() {
        return Err(FacadeError::MalformedDer("truncated OID".into()));
    }

    Ok(arcs
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("."))
}
