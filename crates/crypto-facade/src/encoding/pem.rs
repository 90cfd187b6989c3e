//! PEM framing over DER.
//!
//! Output uses CRLF line endings and a 64-column Base64 body. Input may
//! use CRLF or LF; line boundaries are not part of the encoded data.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{FacadeError, Result};

/// Base64 characters per body line.
pub const LINE_WIDTH: usize = 64;

const BEGIN: &str = "-----BEGIN ";
const END: &str = "-----END ";
const DASHES: &str = "-----";

/// Well-known PEM labels.
pub mod label {
    pub const CERTIFICATE: &str = "CERTIFICATE";
    pub const PRIVATE_KEY: &str = "PRIVATE KEY";
    pub const PUBLIC_KEY: &str = "PUBLIC KEY";
    pub const EC_PRIVATE_KEY: &str = "EC PRIVATE KEY";
    pub const RSA_PRIVATE_KEY: &str = "RSA PRIVATE KEY";
}

/// Encode DER bytes as a PEM block labelled `label`.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let body = STANDARD.encode(der);
    let mut pem = String::with_capacity(body.len() + body.len() / LINE_WIDTH * 2 + 2 * label.len() + 40);

    pem.push_str(BEGIN);
    pem.push_str(label);
    pem.push_str(DASHES);
    pem.push_str("\r\n");
    for start in (0..body.len()).step_by(LINE_WIDTH) {
        pem.push_str(&body[start..body.len().min(start + LINE_WIDTH)]);
        pem.push_str("\r\n");
    }
    // An empty body still gets one (blank) body line so the block stays
    // three lines long and decodes back to zero bytes.
    if body.is_empty() {
        pem.push_str("\r\n");
    }
    pem.push_str(END);
    pem.push_str(label);
    pem.push_str(DASHES);
    pem.push_str("\r\n");
    pem
}

/// Decode a PEM block to DER, ignoring its label.
pub fn pem_to_der(text: &str) -> Result<Vec<u8>> {
    pem_to_der_labeled(text).map(|(_, der)| der)
}

/// Whether `label` survives a BEGIN/END marker line unchanged.
///
/// Labels are single-line printable ASCII without leading or trailing
/// hyphens or spaces. Hyphens inside the label are fine (`X-509 CERT`).
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.bytes().all(|b| (0x20..0x7f).contains(&b))
        && !label.starts_with(['-', ' '])
        && !label.ends_with(['-', ' '])
}

fn marker_label<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)?.strip_suffix(DASHES)
}

/// Decode a PEM block, returning its label alongside the DER bytes.
///
/// BEGIN and END labels must pass [`is_valid_label`] and be identical.
pub fn pem_to_der_labeled(text: &str) -> Result<(String, Vec<u8>)> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .skip_while(|l| l.is_empty())
        .collect();
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(0, |i| i + 1);
    let lines = &lines[..end];

    if lines.len() < 3 {
        return Err(FacadeError::MalformedPem(format!(
            "expected at least 3 lines, found {}",
            lines.len()
        )));
    }

    let first = lines[0];
    let last = lines[lines.len() - 1];
    let begin = marker_label(first, BEGIN)
        .ok_or_else(|| FacadeError::MalformedPem(format!("bad BEGIN line: {first:?}")))?;
    let end = marker_label(last, END)
        .ok_or_else(|| FacadeError::MalformedPem(format!("bad END line: {last:?}")))?;

    if !is_valid_label(begin) {
        return Err(FacadeError::MalformedPem(format!("bad label: {begin:?}")));
    }
    if begin != end {
        return Err(FacadeError::MalformedPem(format!(
            "BEGIN label {begin:?} does not match END label {end:?}"
        )));
    }

    let body: String = lines[1..lines.len() - 1].concat();
    let der = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| FacadeError::MalformedPem(format!("invalid base64 body: {e}")))?;

    Ok((begin.to_string(), der))
}
