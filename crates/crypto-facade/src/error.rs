//! Error types for the crypto facade.
//!
//! Every failure is a deterministic function of the input bytes and is
//! returned to the caller; nothing is retried or partially decoded.
//! Private key material is never included in error messages.

/// Facade error types covering codecs, key marshaling, ciphers and KDFs.
#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    #[error("Malformed PEM: {0}")]
    MalformedPem(String),

    #[error("Malformed DER: {0}")]
    MalformedDer(String),

    #[error("Key format mismatch: {0}")]
    KeyFormatMismatch(String),

    #[error("Invalid PKCS#7 padding")]
    InvalidPadding,

    #[error("Unsupported signature length: {0} bytes")]
    SignatureLengthUnsupported(usize),

    #[error("Input is not block aligned: {remainder} trailing bytes")]
    IncompleteBlock { remainder: usize },

    #[error("Cipher stream already finalized")]
    StreamFinalized,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, FacadeError>;
