//! Send and receive pathway for chat messages.
//!
//! ```text
//! send:    plaintext ──encrypt──▶ Sealed ──format──▶ stored string
//! receive: stored string ──parse──▶ (ciphertext, nonce) ──decrypt──▶ plaintext
//!                        └─ not an envelope ─▶ legacy plaintext
//! ```
//!
//! Failures are returned to the caller and never retried. UIs should show
//! [`UNREADABLE_PLACEHOLDER`] instead of an error string; [`render`] does
//! this for them.

use crate::{
    cipher::{decrypt, encrypt},
    codec::{format, parse},
    error::{CryptoError, Result},
    key::SymmetricKey,
    provider::KeyProvider,
};

/// Text shown in place of a message that failed to decrypt.
pub const UNREADABLE_PLACEHOLDER: &str = "This message could not be displayed";

/// Content recovered from a stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Envelope that decrypted and authenticated.
    Decrypted(String),
    /// Stored before encryption existed, or never encrypted (e.g. stickers).
    Plaintext(String),
}

impl MessageBody {
    /// The displayable text.
    pub fn text(&self) -> &str {
        match self {
            Self::Decrypted(text) | Self::Plaintext(text) => text,
        }
    }

    /// Consume into the displayable text.
    pub fn into_text(self) -> String {
        match self {
            Self::Decrypted(text) | Self::Plaintext(text) => text,
        }
    }
}

/// Encrypt `plaintext` under `key` and wrap it in a storage envelope.
pub fn encrypt_and_format(plaintext: &str, key: &SymmetricKey) -> String {
    let sealed = encrypt(plaintext, key);
    format(&sealed.ciphertext, &sealed.nonce)
}

/// Unwrap a storage envelope and decrypt it under `key`.
///
/// # Errors
///
/// - `DecryptionFailed`: `stored` is not an envelope, or does not decrypt
///   under `key`
pub fn parse_and_decrypt(stored: &str, key: &SymmetricKey) -> Result<String> {
    let parts = parse(stored).ok_or(CryptoError::DecryptionFailed)?;
    decrypt(&parts.ciphertext, &parts.nonce, key)
}

/// Encrypt a new message with the provider's encryption key.
pub fn seal(plaintext: &str, provider: &impl KeyProvider) -> Result<String> {
    let key = provider.encryption_key()?;
    Ok(encrypt_and_format(plaintext, &key))
}

/// Recover a stored message.
///
/// Non-envelope content passes through as [`MessageBody::Plaintext`] without
/// deriving any key. Envelopes are tried against the encryption key, then
/// against each fallback key. Fallbacks are derived only when reached; one
/// that fails to derive is skipped.
///
/// # Errors
///
/// - `DecryptionFailed`: no key authenticates the envelope
/// - `KeyDerivationFailed`/`KeyAgreementFailed`: the encryption key could
///   not be obtained
pub fn open(stored: &str, provider: &impl KeyProvider) -> Result<MessageBody> {
    let Some(parts) = parse(stored) else {
        return Ok(MessageBody::Plaintext(stored.to_owned()));
    };

    let key = provider.encryption_key()?;
    if let Ok(text) = decrypt(&parts.ciphertext, &parts.nonce, &key) {
        return Ok(MessageBody::Decrypted(text));
    }

    for (index, fallback) in provider.fallback_keys().enumerate() {
        let key = match fallback {
            Ok(key) => key,
            Err(err) => {
                tracing::debug!(fallback = index, %err, "skipping legacy key");
                continue;
            },
        };
        let Ok(text) = decrypt(&parts.ciphertext, &parts.nonce, &key) else {
            continue;
        };
        tracing::debug!(fallback = index, "message decrypted with legacy key");
        return Ok(MessageBody::Decrypted(text));
    }

    Err(CryptoError::DecryptionFailed)
}

/// Display text for a stored message.
///
/// A message that fails to decrypt is logged and replaced by
/// [`UNREADABLE_PLACEHOLDER`], so no cryptographic detail reaches the UI.
///
/// # Errors
///
/// - `KeyDerivationFailed`/`KeyAgreementFailed`: the provider is
///   misconfigured. These are returned, not hidden behind the placeholder.
pub fn render(stored: &str, provider: &impl KeyProvider) -> Result<String> {
    match open(stored, provider) {
        Ok(body) => Ok(body.into_text()),
        Err(CryptoError::DecryptionFailed) => {
            tracing::warn!("message could not be displayed");
            Ok(UNREADABLE_PLACEHOLDER.to_owned())
        },
        Err(err) => Err(err),
    }
}
