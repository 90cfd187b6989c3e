//! Streaming adapter over a provider's whole-block transform.
//!
//! Providers only know how to encrypt or decrypt whole 16-byte blocks.
//! [`StreamingBlockCipher`] accepts arbitrarily sized `update` chunks,
//! buffers partial blocks and applies PKCS#7 padding at `finalize`, so the
//! concatenated output never depends on how the input was chunked.
//!
//! On the decrypt side the most recent plaintext block is always held
//! back: it may be the final, padded block, and padding can only be
//! validated once `finalize` confirms the stream has ended.

use zeroize::Zeroize;

use crate::error::{FacadeError, Result};

/// Cipher block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// A provider's raw block primitive.
///
/// `transform` receives one or more whole blocks and must return exactly
/// as many bytes. Chaining state (e.g. the CBC IV) lives in the
/// implementation and carries over between calls.
pub trait BlockTransform: Send {
    fn transform(&mut self, blocks: &[u8]) -> Result<Vec<u8>>;
}

impl<T: BlockTransform + ?Sized> BlockTransform for Box<T> {
    fn transform(&mut self, blocks: &[u8]) -> Result<Vec<u8>> {
        (**self).transform(blocks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// No partial block buffered.
    Ready,
    /// Between 1 and 15 bytes buffered.
    Buffering,
    /// `finalize` has run; the adapter accepts no more input.
    Finalized,
}

/// Chunk-size-independent streaming wrapper around a [`BlockTransform`].
///
/// One instance serves exactly one session: any number of `update` calls
/// followed by one `finalize`.
pub struct StreamingBlockCipher<T: BlockTransform> {
    transform: T,
    direction: Direction,
    state: StreamState,
    pending: Vec<u8>,
    held: Option<Vec<u8>>,
    bytes_in: u64,
    bytes_out: u64,
}

impl<T: BlockTransform> StreamingBlockCipher<T> {
    pub fn new(transform: T, direction: Direction) -> Self {
        Self {
            transform,
            direction,
            state: StreamState::Ready,
            pending: Vec::with_capacity(BLOCK_SIZE),
            held: None,
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    pub fn encryptor(transform: T) -> Self {
        Self::new(transform, Direction::Encrypt)
    }

    pub fn decryptor(transform: T) -> Self {
        Self::new(transform, Direction::Decrypt)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Total bytes accepted by `update`.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Total bytes released to the caller so far.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == StreamState::Finalized {
            return Err(FacadeError::StreamFinalized);
        }
        Ok(())
    }

    fn run(&mut self, blocks: &[u8]) -> Result<Vec<u8>> {
        if blocks.is_empty() || blocks.len() % BLOCK_SIZE != 0 {
            return Err(FacadeError::Internal(format!(
                "{} bytes handed to block transform",
                blocks.len()
            )));
        }
        let out = self.transform.transform(blocks)?;
        if out.len() != blocks.len() {
            return Err(FacadeError::Internal(format!(
                "block transform returned {} bytes for {} input bytes",
                out.len(),
                blocks.len()
            )));
        }
        log::trace!("{:?}: transformed {} blocks", self.direction, blocks.len() / BLOCK_SIZE);
        Ok(out)
    }

    fn settle_state(&mut self) {
        self.state = if self.pending.is_empty() {
            StreamState::Ready
        } else {
            StreamState::Buffering
        };
    }

    /// Feed `chunk` and return whatever output is now safe to release.
    ///
    /// A transform failure finalizes the stream; buffered input is wiped
    /// and later calls return [`FacadeError::StreamFinalized`].
    pub fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        self.ensure_open()?;
        self.bytes_in += chunk.len() as u64;
        self.pending.extend_from_slice(chunk);

        let whole = self.pending.len() - self.pending.len() % BLOCK_SIZE;
        if whole == 0 {
            self.settle_state();
            return Ok(Vec::new());
        }

        let mut blocks: Vec<u8> = self.pending.drain(..whole).collect();
        let result = self.run(&blocks);
        blocks.zeroize();
        let mut out = match result {
            Ok(out) => out,
            Err(e) => {
                self.state = StreamState::Finalized;
                self.pending.zeroize();
                if let Some(held) = self.held.as_mut() {
                    held.zeroize();
                }
                self.held = None;
                return Err(e);
            }
        };

        if self.direction == Direction::Decrypt {
            let newest = out.split_off(out.len() - BLOCK_SIZE);
            let mut released = self.held.replace(newest).unwrap_or_default();
            released.append(&mut out);
            out = released;
        }

        self.bytes_out += out.len() as u64;
        self.settle_state();
        Ok(out)
    }

    /// End the stream.
    ///
    /// Encrypting with `padding` appends a PKCS#7 block; without it the
    /// input must already be block aligned. Decrypting with `padding`
    /// validates and strips the padding from the held-back final block;
    /// without it that block is released as is.
    pub fn finalize(&mut self, padding: bool) -> Result<Vec<u8>> {
        self.ensure_open()?;
        self.state = StreamState::Finalized;

        let out = match self.direction {
            Direction::Encrypt => self.finalize_encrypt(padding)?,
            Direction::Decrypt => self.finalize_decrypt(padding)?,
        };
        self.bytes_out += out.len() as u64;
        Ok(out)
    }

    fn finalize_encrypt(&mut self, padding: bool) -> Result<Vec<u8>> {
        let remainder = (self.bytes_in % BLOCK_SIZE as u64) as usize;
        if remainder != self.pending.len() {
            return Err(FacadeError::Internal(format!(
                "{} bytes buffered but input length leaves {remainder}",
                self.pending.len()
            )));
        }

        if !padding {
            if remainder != 0 {
                return Err(FacadeError::IncompleteBlock { remainder });
            }
            return Ok(Vec::new());
        }

        let pad = BLOCK_SIZE - remainder;
        let mut last = std::mem::take(&mut self.pending);
        last.resize(BLOCK_SIZE, pad as u8);
        let result = self.run(&last);
        last.zeroize();
        result
    }

    fn finalize_decrypt(&mut self, padding: bool) -> Result<Vec<u8>> {
        if !self.pending.is_empty() {
            return Err(FacadeError::IncompleteBlock {
                remainder: self.pending.len(),
            });
        }

        let held = self.held.take();
        if !padding {
            return Ok(held.unwrap_or_default());
        }

        let Some(mut block) = held else {
            return Err(FacadeError::InvalidPadding);
        };
        let pad = usize::from(block[BLOCK_SIZE - 1]);
        let valid = (1..=BLOCK_SIZE).contains(&pad)
            && block[BLOCK_SIZE - pad..].iter().all(|&b| usize::from(b) == pad);
        if !valid {
            block.zeroize();
            log::debug!("rejecting final block with bad PKCS#7 padding");
            return Err(FacadeError::InvalidPadding);
        }
        block.truncate(BLOCK_SIZE - pad);
        Ok(block)
    }
}

impl<T: BlockTransform> Drop for StreamingBlockCipher<T> {
    fn drop(&mut self) {
        self.pending.zeroize();
        if let Some(held) = self.held.as_mut() {
            held.zeroize();
        }
    }
}

/// Encrypt `data` in one call.
pub fn encrypt_all<T: BlockTransform>(transform: T, data: &[u8], padding: bool) -> Result<Vec<u8>> {
    let mut stream = StreamingBlockCipher::encryptor(transform);
    let mut out = stream.update(data)?;
    out.extend(stream.finalize(padding)?);
    Ok(out)
}

/// Decrypt `data` in one call.
pub fn decrypt_all<T: BlockTransform>(transform: T, data: &[u8], padding: bool) -> Result<Vec<u8>> {
    let mut stream = StreamingBlockCipher::decryptor(transform);
    let mut out = stream.update(data)?;
    out.extend(stream.finalize(padding)?);
    Ok(out)
}
