//! Key providers: how a conversation obtains its symmetric key.
//!
//! Two strategies exist side by side and are never merged:
//!
//! - [`DerivedKeys`]: deterministic, identifier-based, zero round trips.
//!   Anyone who knows the identifiers can derive the key.
//! - [`AgreedKeys`]: ECDH between two key pairs. Only the two private key
//!   holders can derive the key.
//!
//! The caller picks one per conversation and passes it explicitly into
//! [`crate::message::seal`] and [`crate::message::open`]. No provider caches
//! keys; each call derives fresh.

use crate::{
    agreement::{KeyPair, PublicKey, derive_shared_secret},
    derivation::{Conversation, derive_group_key_legacy},
    error::Result,
    key::SymmetricKey,
};

/// Source of the symmetric key for one conversation.
pub trait KeyProvider {
    /// Key for encrypting new messages.
    fn encryption_key(&self) -> Result<SymmetricKey>;

    /// Decryption-only fallbacks for older stored messages, in order.
    ///
    /// Tried only after the encryption key fails to authenticate. Each key is
    /// derived when the iterator reaches it, and a key that fails to derive
    /// does not stop the ones after it.
    fn fallback_keys(&self) -> Box<dyn Iterator<Item = Result<SymmetricKey>> + '_> {
        Box::new(std::iter::empty())
    }
}

/// Identifier-based keys for a direct or group conversation.
///
/// For groups, legacy authors may be registered. Their per-user legacy keys
/// are offered through [`KeyProvider::fallback_keys`] so messages stored under
/// the retired scheme stay readable. They are never used to encrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKeys {
    conversation: Conversation,
    legacy_authors: Vec<String>,
}

impl DerivedKeys {
    /// Provider for `conversation` with no legacy fallback.
    pub fn new(conversation: Conversation) -> Self {
        Self { conversation, legacy_authors: Vec::new() }
    }

    /// Also try the legacy group key of `user_id` when decrypting.
    ///
    /// Typically the stored message's author. Ignored for direct chats,
    /// which never had a legacy scheme.
    #[must_use]
    pub fn with_legacy_author(mut self, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        if !self.legacy_authors.contains(&user_id) {
            self.legacy_authors.push(user_id);
        }
        self
    }

    /// The conversation these keys belong to.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

impl KeyProvider for DerivedKeys {
    fn encryption_key(&self) -> Result<SymmetricKey> {
        self.conversation.derive_key()
    }

    fn fallback_keys(&self) -> Box<dyn Iterator<Item = Result<SymmetricKey>> + '_> {
        let Conversation::Group(group_id) = &self.conversation else {
            return Box::new(std::iter::empty());
        };

        Box::new(
            self.legacy_authors.iter().map(move |author| derive_group_key_legacy(group_id, author)),
        )
    }
}

/// ECDH-agreed key between our key pair and a peer's public key.
#[derive(Debug)]
pub struct AgreedKeys<'a> {
    mine: &'a KeyPair,
    theirs: PublicKey,
}

impl<'a> AgreedKeys<'a> {
    /// Provider for a two-party conversation with `theirs`.
    pub fn new(mine: &'a KeyPair, theirs: PublicKey) -> Self {
        Self { mine, theirs }
    }
}

impl KeyProvider for AgreedKeys<'_> {
    fn encryption_key(&self) -> Result<SymmetricKey> {
        Ok(derive_shared_secret(self.mine, &self.theirs))
    }
}
