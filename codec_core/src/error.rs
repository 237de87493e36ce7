//! The error taxonomy shared by every codec and RSA entry point.
//!
//! Variant names follow the "kind, not type" table in the specification:
//! each decompressor raises [`CodecError::InvalidData`] on a malformed
//! frame, RSA raises the three padding/length-specific variants, and
//! [`CodecError::InternalFailure`] covers RNG/retry exhaustion. No variant
//! is ever raised alongside partial output.

/// Errors surfaced by codec and RSA operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A compressed frame violates its on-the-wire format: truncated
    /// header, bad RLE digit sequence, unterminated Huffman code, a
    /// malformed big-float, or an unknown LZW code.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// RSA plaintext exceeds `keyLen - 11` bytes.
    #[error("message too long: {0}")]
    MessageTooLong(String),

    /// RSA ciphertext length does not equal `keyLen`.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// RSA decryption did not find a `00 02` PKCS#1 v1.5 header, or no
    /// `0x00` padding terminator.
    #[error("invalid padding: {0}")]
    InvalidPadding(String),

    /// Underlying RNG failure or a bounded retry loop was exhausted.
    #[error("internal failure: {0}")]
    InternalFailure(String),
}
