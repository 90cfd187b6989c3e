//! AES-256-CBC block engine on the RustCrypto `aes` and `cbc` crates.
//!
//! The transforms see whole blocks only; padding and chunking are handled
//! by [`StreamingBlockCipher`](crate::cipher::StreamingBlockCipher).

use aes::Aes256;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use cbc::{Decryptor, Encryptor};

use crate::cipher::{BlockTransform, BLOCK_SIZE};
use crate::error::{FacadeError, Result};
use crate::provider::{check_len, SymmetricCapability};

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

/// CBC encryptor; chaining state carries across `transform` calls.
struct CbcEncryptBlocks(Encryptor<Aes256>);

impl BlockTransform for CbcEncryptBlocks {
    fn transform(&mut self, blocks: &[u8]) -> Result<Vec<u8>> {
        let mut out = blocks.to_vec();
        for block in out.chunks_exact_mut(BLOCK_SIZE) {
            self.0.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        Ok(out)
    }
}

struct CbcDecryptBlocks(Decryptor<Aes256>);

impl BlockTransform for CbcDecryptBlocks {
    fn transform(&mut self, blocks: &[u8]) -> Result<Vec<u8>> {
        let mut out = blocks.to_vec();
        for block in out.chunks_exact_mut(BLOCK_SIZE) {
            self.0.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        Ok(out)
    }
}

fn check_key_iv(key: &[u8], iv: &[u8]) -> Result<()> {
    check_len(key, KEY_LEN, "AES-256 key")?;
    check_len(iv, IV_LEN, "CBC IV")
}

/// Software AES-256-CBC.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256CbcProvider;

impl SymmetricCapability for Aes256CbcProvider {
    fn name(&self) -> &'static str {
        "AES-256-CBC"
    }

    fn key_len(&self) -> usize {
        KEY_LEN
    }

    fn iv_len(&self) -> usize {
        IV_LEN
    }

    fn block_encryptor(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn BlockTransform>> {
        check_key_iv(key, iv)?;
        let cipher = Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|e| FacadeError::Provider(format!("AES-256-CBC init: {e}")))?;
        Ok(Box::new(CbcEncryptBlocks(cipher)))
    }

    fn block_decryptor(&self, key: &[u8], iv: &[u8]) -> Result<Box<dyn BlockTransform>> {
        check_key_iv(key, iv)?;
        let cipher = Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|e| FacadeError::Provider(format!("AES-256-CBC init: {e}")))?;
        Ok(Box::new(CbcDecryptBlocks(cipher)))
    }
}
