//! Error types for message encryption.
//!
//! Every failure propagates to the caller. A stored string that is not an
//! envelope is not an error: [`crate::codec::parse`] returns `None` for it.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors produced by key establishment and decryption.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Identifier input was rejected or the KDF could not produce a key.
    ///
    /// Fatal for the operation. Never replaced by a default key.
    #[error("key derivation failed: {reason}")]
    KeyDerivationFailed {
        /// What was wrong with the input
        reason: String,
    },

    /// The message could not be decrypted.
    ///
    /// Covers tag mismatch, wrong nonce length, undecodable envelope and
    /// invalid UTF-8 alike. Deliberately carries no detail so callers cannot
    /// tell the cases apart.
    #[error("decryption failed")]
    DecryptionFailed,

    /// A public or private key could not be imported, or the exchange
    /// produced no usable secret.
    #[error("key agreement failed: {reason}")]
    KeyAgreementFailed {
        /// What was wrong with the key material
        reason: String,
    },
}
