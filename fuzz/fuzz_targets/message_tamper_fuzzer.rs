//! Fuzz target for the encrypt → store → open pathway
//!
//! Encrypts arbitrary plaintext, applies an arbitrary mutation to the
//! stored envelope, and opens it again.
//!
//! # Invariants
//!
//! - Unmodified envelopes always decrypt to the original plaintext
//! - Any ciphertext or nonce change fails with `DecryptionFailed`
//! - Nothing ever decrypts to a different plaintext
//! - `open` never panics, whatever the stored text

#![no_main]

use std::sync::LazyLock;

use accounted_crypto::{
    CryptoError, KeyProvider, MessageBody, SymmetricKey, derive_direct_key, encrypt, format, open,
    parse,
};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

// PBKDF2 would dominate every iteration otherwise
static KEY: LazyLock<SymmetricKey> =
    LazyLock::new(|| derive_direct_key("alice", "bob").unwrap());

#[derive(Debug, Arbitrary)]
enum Mutation {
    None,
    FlipCiphertextBit { index: u16, bit: u8 },
    FlipNonceBit { index: u8, bit: u8 },
    TruncateCiphertext { keep: u16 },
    ResizeNonce { len: u8 },
    ReplaceStored(String),
}

/// Provider returning the cached key, so `open` is exercised end to end.
struct CachedKeys;

impl KeyProvider for CachedKeys {
    fn encryption_key(&self) -> accounted_crypto::Result<SymmetricKey> {
        Ok(KEY.clone())
    }
}

fuzz_target!(|input: (String, Mutation)| {
    let (plaintext, mutation) = input;
    let sealed = encrypt(&plaintext, &KEY);
    let original = format(&sealed.ciphertext, &sealed.nonce);

    let mut ciphertext = sealed.ciphertext.clone();
    let mut nonce = sealed.nonce.to_vec();
    let mut replacement = None;

    match mutation {
        Mutation::None => {},
        Mutation::FlipCiphertextBit { index, bit } => {
            let index = index as usize % ciphertext.len();
            ciphertext[index] ^= 1 << (bit % 8);
        },
        Mutation::FlipNonceBit { index, bit } => {
            let index = index as usize % nonce.len();
            nonce[index] ^= 1 << (bit % 8);
        },
        Mutation::TruncateCiphertext { keep } => {
            let keep = keep as usize % ciphertext.len();
            ciphertext.truncate(keep);
        },
        Mutation::ResizeNonce { len } => nonce.resize(len as usize, 0),
        Mutation::ReplaceStored(text) => replacement = Some(text),
    }

    let tampered = replacement.is_none()
        && (ciphertext != sealed.ciphertext || nonce.as_slice() != sealed.nonce.as_slice());
    let stored = replacement.unwrap_or_else(|| format(&ciphertext, &nonce));

    // INVARIANT: open never panics
    match open(&stored, &CachedKeys) {
        Ok(MessageBody::Decrypted(text)) => {
            assert!(!tampered, "tampered envelope must not decrypt");
            assert_eq!(text, plaintext, "decryption must never yield other plaintext");
        },
        Ok(MessageBody::Plaintext(text)) => {
            assert!(parse(&stored).is_none());
            assert_eq!(text, stored);
        },
        Err(err) => {
            assert_eq!(err, CryptoError::DecryptionFailed);
            assert_ne!(stored, original, "untouched envelope must decrypt");
        },
    }
});
