//! Message encryption using AES-256-GCM
//!
//! Every call to [`encrypt`] draws a fresh 96-bit nonce from the OS RNG.
//! Callers never supply nonces, so a nonce cannot be reused under a key by
//! construction.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};

use crate::{
    error::{CryptoError, Result},
    key::SymmetricKey,
};

/// Size of the AES-GCM nonce (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Output of one encryption: ciphertext with embedded tag, and its nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Ciphertext including the 16-byte GCM tag
    pub ciphertext: Vec<u8>,
    /// The 12-byte nonce used for this message
    pub nonce: [u8; NONCE_SIZE],
}

impl Sealed {
    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }
}

/// Encrypt a UTF-8 message under `key`.
///
/// # Security
///
/// - Nonce is 12 random bytes from the OS RNG, never derived from content
/// - Two calls with the same plaintext and key produce different output
pub fn encrypt(plaintext: &str, key: &SymmetricKey) -> Sealed {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes()) else {
        unreachable!("AES-256-GCM encryption cannot fail for messages below 64 GiB");
    };

    Sealed { ciphertext, nonce }
}

/// Decrypt and authenticate a message.
///
/// # Errors
///
/// - `DecryptionFailed`: wrong nonce length, tag mismatch (wrong key,
///   tampered ciphertext or nonce), or plaintext that is not UTF-8. The
///   cases are indistinguishable to the caller.
pub fn decrypt(ciphertext: &[u8], nonce: &[u8], key: &SymmetricKey) -> Result<String> {
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
}
