//! HKDF extract-and-expand (RFC 5869).
//!
//! The block counter is written as the minimal big-endian encoding of the
//! block index rather than a single octet. For the first 255 blocks this is
//! identical to RFC 5869; past that the counter grows to two or more bytes
//! and the output length is not capped at 255 blocks.

use zeroize::Zeroizing;

use crate::encoding::bignum::strip_leading_zeros;
use crate::error::Result;
use crate::kdf::check_output_len;
use crate::kdf::mac::KeyedHash;

/// Minimal big-endian bytes of a block index (index >= 1).
fn counter_bytes(index: u64) -> Vec<u8> {
    strip_leading_zeros(&index.to_be_bytes()).to_vec()
}

/// Derive `length` bytes from `secret`.
///
/// An empty `salt` keys the extract step with the empty string, which HMAC
/// treats the same as a hash-length run of zeros. `length` above
/// [`MAX_OUTPUT_LEN`](crate::kdf::MAX_OUTPUT_LEN) is an `InvalidParameter`.
pub fn hkdf(
    hash: &dyn KeyedHash,
    secret: &[u8],
    length: usize,
    salt: &[u8],
    info: &[u8],
) -> Result<Vec<u8>> {
    check_output_len("HKDF", length)?;
    let prk = Zeroizing::new(hash.mac(salt, &[secret])?);

    let mut okm = Vec::with_capacity(length + hash.output_len());
    let mut previous = Zeroizing::new(Vec::new());
    let mut index: u64 = 1;
    while okm.len() < length {
        let counter = counter_bytes(index);
        let block = hash.mac(&prk, &[previous.as_slice(), info, counter.as_slice()])?;
        okm.extend_from_slice(&block);
        *previous = block;
        index += 1;
    }
    okm.truncate(length);

    log::debug!("hkdf: expanded {length} bytes over {} blocks", index - 1);
    Ok(okm)
}
