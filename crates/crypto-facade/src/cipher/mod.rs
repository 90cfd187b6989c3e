//! Symmetric cipher plumbing shared by all block providers.

pub mod stream;

pub use stream::{
    decrypt_all, encrypt_all, BlockTransform, Direction, StreamState, StreamingBlockCipher,
    BLOCK_SIZE,
};
