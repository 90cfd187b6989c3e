//! Keyed-hash primitives for the KDFs.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{FacadeError, Result};

/// A keyed hash (HMAC) usable by [`hkdf`](super::hkdf) and
/// [`pbkdf2`](super::pbkdf2).
///
/// `mac` authenticates the concatenation of `parts` under `key`; callers
/// pass pieces separately to avoid building the concatenation themselves.
pub trait KeyedHash: Send + Sync {
    /// Digest output length in bytes.
    fn output_len(&self) -> usize;

    fn mac(&self, key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>>;
}

macro_rules! hmac_keyed_hash {
    ($name:ident, $digest:ty, $len:expr, $label:literal) => {
        #[doc = concat!("HMAC-", $label, ".")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl KeyedHash for $name {
            fn output_len(&self) -> usize {
                $len
            }

            fn mac(&self, key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>> {
                let mut mac = <Hmac<$digest> as Mac>::new_from_slice(key)
                    .map_err(|e| FacadeError::Provider(format!("HMAC-{} key: {e}", $label)))?;
                for part in parts {
                    mac.update(part);
                }
                Ok(mac.finalize().into_bytes().to_vec())
            }
        }
    };
}

hmac_keyed_hash!(HmacSha256, Sha256, 32, "SHA256");
hmac_keyed_hash!(HmacSha384, Sha384, 48, "SHA384");
hmac_keyed_hash!(HmacSha512, Sha512, 64, "SHA512");
