//! Key derivation over an injectable keyed hash.
//!
//! Both KDFs are pure functions of their arguments; the digest is chosen by
//! passing a [`KeyedHash`] implementation.

pub mod hkdf;
pub mod mac;
pub mod pbkdf2;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{FacadeError, Result};

pub use self::hkdf::hkdf;
pub use self::mac::{HmacSha256, HmacSha384, HmacSha512, KeyedHash};
pub use self::pbkdf2::pbkdf2;

/// Largest output either KDF will produce in one call.
pub const MAX_OUTPUT_LEN: usize = 1 << 30;

pub(crate) fn check_output_len(kdf: &str, length: usize) -> Result<()> {
    if length > MAX_OUTPUT_LEN {
        return Err(FacadeError::InvalidParameter(format!(
            "{kdf} output of {length} bytes exceeds the {MAX_OUTPUT_LEN}-byte limit"
        )));
    }
    Ok(())
}

/// Symmetric key and IV carved from one KDF output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricMaterial {
    pub key: Vec<u8>,
    pub iv: Vec<u8>,
}

impl std::fmt::Debug for SymmetricMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricMaterial")
            .field("key_len", &self.key.len())
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

/// Expand `secret` with HKDF and split the output into key ‖ IV.
pub fn derive_key_iv(
    hash: &dyn KeyedHash,
    secret: &[u8],
    salt: &[u8],
    info: &[u8],
    key_len: usize,
    iv_len: usize,
) -> Result<SymmetricMaterial> {
    if key_len == 0 {
        return Err(FacadeError::InvalidParameter(
            "symmetric key length must be non-zero".into(),
        ));
    }
    let total = key_len.checked_add(iv_len).ok_or_else(|| {
        FacadeError::InvalidParameter("key and IV lengths overflow".into())
    })?;
    let mut okm = hkdf(hash, secret, total, salt, info)?;
    let iv = okm.split_off(key_len);
    Ok(SymmetricMaterial { key: okm, iv })
}
