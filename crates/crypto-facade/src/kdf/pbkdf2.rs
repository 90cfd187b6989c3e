//! PBKDF2 (RFC 8018, section 5.2).

use zeroize::Zeroizing;

use crate::error::{FacadeError, Result};
use crate::kdf::check_output_len;
use crate::kdf::mac::KeyedHash;

/// Derive `length` bytes from `password` and `salt`.
pub fn pbkdf2(
    hash: &dyn KeyedHash,
    password: &[u8],
    length: usize,
    iterations: u32,
    salt: &[u8],
) -> Result<Vec<u8>> {
    if iterations == 0 {
        return Err(FacadeError::InvalidParameter(
            "PBKDF2 iteration count must be at least 1".into(),
        ));
    }
    check_output_len("PBKDF2", length)?;
    let blocks = length.div_ceil(hash.output_len());
    let last = u32::try_from(blocks).map_err(|_| {
        FacadeError::InvalidParameter(format!(
            "PBKDF2 output of {length} bytes needs more than 2^32-1 blocks"
        ))
    })?;

    let mut dk = Vec::with_capacity(blocks * hash.output_len());
    for index in 1..=last {
        let mut u = Zeroizing::new(hash.mac(password, &[salt, index.to_be_bytes().as_slice()])?);
        let mut block = Zeroizing::new(u.to_vec());
        for _ in 1..iterations {
            *u = hash.mac(password, &[u.as_slice()])?;
            block.iter_mut().zip(u.iter()).for_each(|(b, x)| *b ^= x);
        }
        dk.extend_from_slice(&block);
    }
    dk.truncate(length);

    log::debug!("pbkdf2: {blocks} blocks at {iterations} iterations");
    Ok(dk)
}
