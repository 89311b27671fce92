//! Accounted Message Encryption
//!
//! End-to-end confidentiality for direct and group chat content. The message
//! store only ever sees envelopes; keys are established on each device and
//! never stored or transmitted.
//!
//! # Key Establishment
//!
//! Two independent strategies, chosen by the caller per conversation through
//! the [`KeyProvider`] capability:
//!
//! ```text
//! Identifiers ("alice","bob") / ("g1")      P-256 key pairs
//!        │                                        │
//!        ▼                                        ▼
//! PBKDF2-HMAC-SHA256 (100k, fixed salt)     ECDH (x-coordinate)
//!        │                                        │
//!        └──────────────► SymmetricKey ◄──────────┘
//!                             │
//!                             ▼
//!               AES-256-GCM, random 96-bit nonce
//!                             │
//!                             ▼
//!       {"encrypted":true,"data":"<b64>","iv":"<b64>"}
//! ```
//!
//! # Security
//!
//! Confidentiality and integrity:
//! - AES-256-GCM with a fresh random nonce per message
//! - Any bit flip in ciphertext or nonce fails authentication
//! - All decryption failures look identical to the caller
//!
//! Known weakness of identifier-based keys:
//! - [`derivation`] keys depend only on identifiers and code-embedded salts
//! - Anyone who learns a conversation's identifiers can derive its key
//! - Kept for compatibility with stored history; do not extend it to new
//!   conversation types without flagging the same weakness
//!
//! Agreed keys:
//! - [`agreement`] keys are only derivable by the two private key holders
//!
//! Legacy compatibility:
//! - Group messages from the retired per-user scheme decrypt through
//!   [`DerivedKeys::with_legacy_author`]; new messages never use it
//! - Content that is not an envelope is legacy plaintext, not an error

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod agreement;
pub mod cipher;
pub mod codec;
pub mod derivation;
pub mod error;
pub mod key;
pub mod message;
pub mod provider;

pub use agreement::{
    KeyPair, PublicKey, derive_shared_secret, export_public_key, generate_key_pair,
    import_public_key,
};
pub use cipher::{NONCE_SIZE, Sealed, TAG_SIZE, decrypt, encrypt};
pub use codec::{EnvelopeParts, format, is_encrypted, parse};
pub use derivation::{
    Conversation, PBKDF2_ITERATIONS, derive_direct_key, derive_group_key, derive_group_key_legacy,
};
pub use error::{CryptoError, Result};
pub use key::{KEY_SIZE, SymmetricKey};
pub use message::{
    MessageBody, UNREADABLE_PLACEHOLDER, encrypt_and_format, open, parse_and_decrypt, render, seal,
};
pub use provider::{AgreedKeys, DerivedKeys, KeyProvider};
