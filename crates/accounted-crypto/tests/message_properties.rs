//! Property-based tests for message encryption
//!
//! These tests verify the fundamental invariants of the message pathway:
//!
//! 1. **Round-trip**: decrypt(encrypt(p)) == p for all UTF-8 plaintexts
//! 2. **Non-determinism**: encrypting twice never repeats a nonce
//! 3. **Tamper detection**: any single bit flip fails authentication
//! 4. **Envelope round-trip**: parse(format(c, n)) == (c, n)
//! 5. **Detection is total**: parse never panics on arbitrary text

use std::sync::LazyLock;

use accounted_crypto::{
    CryptoError, NONCE_SIZE, SymmetricKey, decrypt, derive_direct_key, derive_group_key, encrypt,
    format, is_encrypted, parse,
};
use proptest::prelude::*;

// PBKDF2 is slow; derive the fixtures once
static KEY: LazyLock<SymmetricKey> =
    LazyLock::new(|| derive_direct_key("alice", "bob").unwrap());
static OTHER_KEY: LazyLock<SymmetricKey> = LazyLock::new(|| derive_group_key("g1").unwrap());

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_encrypt_decrypt_roundtrip(plaintext in any::<String>()) {
        let sealed = encrypt(&plaintext, &KEY);
        let decrypted = decrypt(&sealed.ciphertext, &sealed.nonce, &KEY).unwrap();

        prop_assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn prop_encryption_not_deterministic(plaintext in any::<String>()) {
        let first = encrypt(&plaintext, &KEY);
        let second = encrypt(&plaintext, &KEY);

        prop_assert_ne!(first.nonce, second.nonce);
        prop_assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn prop_wrong_key_fails(plaintext in any::<String>()) {
        let sealed = encrypt(&plaintext, &KEY);

        prop_assert_eq!(
            decrypt(&sealed.ciphertext, &sealed.nonce, &OTHER_KEY),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn prop_ciphertext_bit_flip_detected(
        plaintext in ".{0,64}",
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut sealed = encrypt(&plaintext, &KEY);
        let index = position.index(sealed.ciphertext.len());
        sealed.ciphertext[index] ^= 1 << bit;

        prop_assert_eq!(
            decrypt(&sealed.ciphertext, &sealed.nonce, &KEY),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn prop_nonce_bit_flip_detected(
        plaintext in ".{0,64}",
        index in 0usize..NONCE_SIZE,
        bit in 0u8..8,
    ) {
        let mut sealed = encrypt(&plaintext, &KEY);
        sealed.nonce[index] ^= 1 << bit;

        prop_assert_eq!(
            decrypt(&sealed.ciphertext, &sealed.nonce, &KEY),
            Err(CryptoError::DecryptionFailed)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_envelope_roundtrip(
        ciphertext in prop::collection::vec(any::<u8>(), 0..512),
        nonce in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let parts = parse(&format(&ciphertext, &nonce)).unwrap();

        prop_assert_eq!(parts.ciphertext, ciphertext);
        prop_assert_eq!(parts.nonce, nonce);
    }

    #[test]
    fn prop_parse_never_panics(stored in any::<String>()) {
        let _ = parse(&stored);
    }

    #[test]
    fn prop_plain_sentences_are_not_envelopes(stored in "[a-zA-Z0-9 .,!?']{0,200}") {
        prop_assert!(!is_encrypted(&stored));
    }
}
