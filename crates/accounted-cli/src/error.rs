//! CLI error types.

use std::io;

use accounted_crypto::CryptoError;
use thiserror::Error;

/// Errors surfaced by `accounted-crypt`.
#[derive(Error, Debug)]
pub enum CliError {
    /// Arguments were syntactically valid but do not select an operation.
    #[error("usage: {0}")]
    Usage(String),

    /// Key establishment or decryption failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Reading stdin or writing stdout failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_display() {
        let err = CliError::Usage("pick a key".to_string());
        assert_eq!(err.to_string(), "usage: pick a key");

        let err = CliError::from(CryptoError::DecryptionFailed);
        assert_eq!(err.to_string(), "decryption failed");
    }
}
