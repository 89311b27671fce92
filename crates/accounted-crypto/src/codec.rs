//! Storage envelope for encrypted messages.
//!
//! The message store's content column holds either a plain legacy string or
//! a JSON envelope:
//!
//! ```text
//! {"encrypted":true,"data":"<base64 ciphertext+tag>","iv":"<base64 nonce>"}
//! ```
//!
//! Detection never fails. Anything that is not a well-formed envelope is
//! legacy plaintext and [`parse`] returns `None` for it.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Wire shape of the envelope. Unknown fields are ignored.
#[derive(Serialize, Deserialize)]
struct Envelope {
    encrypted: bool,
    data: String,
    iv: String,
}

/// Decoded envelope contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeParts {
    /// Ciphertext including the authentication tag
    pub ciphertext: Vec<u8>,
    /// Nonce as stored; its length is checked at decryption
    pub nonce: Vec<u8>,
}

/// Serialize a ciphertext and nonce into the storage envelope.
pub fn format(ciphertext: &[u8], nonce: &[u8]) -> String {
    let envelope = Envelope {
        encrypted: true,
        data: STANDARD.encode(ciphertext),
        iv: STANDARD.encode(nonce),
    };

    let Ok(stored) = serde_json::to_string(&envelope) else {
        unreachable!("an envelope of one bool and two strings always serializes");
    };
    stored
}

/// Interpret `stored` as an envelope.
///
/// Returns `None` when the text is not JSON, lacks `encrypted`, `data` or
/// `iv`, has `encrypted` set to anything but `true`, or carries fields that
/// are not valid base64.
pub fn parse(stored: &str) -> Option<EnvelopeParts> {
    let envelope: Envelope = serde_json::from_str(stored).ok()?;
    if !envelope.encrypted {
        return None;
    }

    let ciphertext = STANDARD.decode(envelope.data.as_bytes()).ok()?;
    let nonce = STANDARD.decode(envelope.iv.as_bytes()).ok()?;

    Some(EnvelopeParts { ciphertext, nonce })
}

/// Whether `stored` is an encrypted envelope rather than legacy plaintext.
pub fn is_encrypted(stored: &str) -> bool {
    parse(stored).is_some()
}
