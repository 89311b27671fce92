//! Identifier-based key derivation using PBKDF2-HMAC-SHA256
//!
//! Every participant derives the same conversation key from identifiers it
//! already knows, with no network round trip.
//!
//! # Security
//!
//! Key secrecy rests entirely on the salts and the key material layout
//! staying undisclosed. Anyone who knows the scheme and the conversation's
//! identifiers can compute the key without being a member. Stored history
//! depends on this exact behavior, so it is preserved as-is; see
//! [`crate::agreement`] for the construction that does not have this
//! weakness.

use std::cmp::Ordering;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::{
    error::{CryptoError, Result},
    key::{KEY_SIZE, SymmetricKey},
};

/// PBKDF2 iteration count shared by every derivation.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt for direct-chat keys
pub const DIRECT_SALT: &[u8] = b"accounted-chat-salt";

/// Salt for group-chat keys, current and legacy
pub const GROUP_SALT: &[u8] = b"accounted-group-salt";

/// Suffix appended to direct-chat key material
const DIRECT_LABEL: &str = "chat-secret";

/// Suffix appended to group-chat key material
const GROUP_LABEL: &str = "group-secret";

/// Who a conversation is between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    /// Two users. `Direct(a, b)` and `Direct(b, a)` share a key.
    Direct(String, String),
    /// A group, keyed by its identifier alone.
    Group(String),
}

impl Conversation {
    /// Direct chat between two users, in any order.
    pub fn direct(user_a: impl Into<String>, user_b: impl Into<String>) -> Self {
        Self::Direct(user_a.into(), user_b.into())
    }

    /// Group chat.
    pub fn group(group_id: impl Into<String>) -> Self {
        Self::Group(group_id.into())
    }

    /// Derive this conversation's current key.
    pub fn derive_key(&self) -> Result<SymmetricKey> {
        match self {
            Self::Direct(a, b) => derive_direct_key(a, b),
            Self::Group(group_id) => derive_group_key(group_id),
        }
    }
}

/// Derive the key for a direct chat between two users.
///
/// The identifiers are ordered before use, so argument order does not
/// matter. Key material is `"{low}:{high}:chat-secret"`.
pub fn derive_direct_key(user_a: &str, user_b: &str) -> Result<SymmetricKey> {
    require_identifier("user id", user_a)?;
    require_identifier("user id", user_b)?;

    let (low, high) = match utf16_cmp(user_a, user_b) {
        Ordering::Greater => (user_b, user_a),
        _ => (user_a, user_b),
    };

    let material = Zeroizing::new(format!("{low}:{high}:{DIRECT_LABEL}"));
    tracing::debug!(kind = "direct", "deriving conversation key");

    Ok(stretch(material.as_bytes(), DIRECT_SALT))
}

/// Derive the key for a group chat.
///
/// Independent of the calling member, so every member derives the same key.
/// Key material is `"{group_id}:group-secret"`.
pub fn derive_group_key(group_id: &str) -> Result<SymmetricKey> {
    require_identifier("group id", group_id)?;

    let material = Zeroizing::new(format!("{group_id}:{GROUP_LABEL}"));
    tracing::debug!(kind = "group", "deriving conversation key");

    Ok(stretch(material.as_bytes(), GROUP_SALT))
}

/// Derive a group key under the retired per-user scheme.
///
/// Key material is `"{group_id}:{user_id}:group-secret"`. Only for
/// decrypting messages stored before the switch to [`derive_group_key`];
/// never encrypt with the result.
pub fn derive_group_key_legacy(group_id: &str, user_id: &str) -> Result<SymmetricKey> {
    require_identifier("group id", group_id)?;
    require_identifier("user id", user_id)?;

    let material = Zeroizing::new(format!("{group_id}:{user_id}:{GROUP_LABEL}"));
    tracing::debug!(kind = "group-legacy", "deriving conversation key");

    Ok(stretch(material.as_bytes(), GROUP_SALT))
}

fn require_identifier(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(CryptoError::KeyDerivationFailed { reason: format!("empty {what}") });
    }
    Ok(())
}

/// Compare by UTF-16 code units, the order earlier clients sorted by.
///
/// Differs from byte order only when one side has a character above
/// U+FFFF and the other a character in U+E000..=U+FFFF at the same position.
fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn stretch(material: &[u8], salt: &[u8]) -> SymmetricKey {
    let mut out = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(material, salt, PBKDF2_ITERATIONS, &mut out);

    let key = SymmetricKey::from_bytes(out);
    out.zeroize();
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_is_order_independent() {
        let forward = derive_direct_key("u1", "u2").unwrap();
        let reverse = derive_direct_key("u2", "u1").unwrap();

        assert_eq!(forward, reverse);
    }

    #[test]
    fn direct_key_is_deterministic() {
        assert_eq!(
            derive_direct_key("alice", "bob").unwrap(),
            derive_direct_key("alice", "bob").unwrap()
        );
    }

    #[test]
    fn different_pairs_produce_different_keys() {
        let ab = derive_direct_key("alice", "bob").unwrap();
        let ac = derive_direct_key("alice", "carol").unwrap();

        assert_ne!(ab, ac);
    }

    #[test]
    fn direct_key_matches_manual_derivation() {
        let mut expected = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(b"alice:bob:chat-secret", DIRECT_SALT, PBKDF2_ITERATIONS, &mut expected);

        assert_eq!(derive_direct_key("bob", "alice").unwrap().as_bytes(), &expected);
    }

    #[test]
    fn group_key_matches_manual_derivation() {
        let mut expected = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(b"g1:group-secret", GROUP_SALT, PBKDF2_ITERATIONS, &mut expected);

        assert_eq!(derive_group_key("g1").unwrap().as_bytes(), &expected);
    }

    #[test]
    fn legacy_group_key_mixes_in_user() {
        let mut expected = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(b"g1:u7:group-secret", GROUP_SALT, PBKDF2_ITERATIONS, &mut expected);

        let legacy = derive_group_key_legacy("g1", "u7").unwrap();

        assert_eq!(legacy.as_bytes(), &expected);
        assert_ne!(legacy, derive_group_key("g1").unwrap());
        assert_ne!(legacy, derive_group_key_legacy("g1", "u8").unwrap());
    }

    #[test]
    fn distinct_groups_produce_distinct_keys() {
        assert_ne!(derive_group_key("g1").unwrap(), derive_group_key("g2").unwrap());
    }

    #[test]
    fn direct_and_group_salts_are_separated() {
        // Same material under the two salts must not collide
        let mut direct = [0u8; KEY_SIZE];
        let mut group = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(b"x", DIRECT_SALT, 1, &mut direct);
        pbkdf2_hmac::<Sha256>(b"x", GROUP_SALT, 1, &mut group);

        assert_ne!(direct, group);
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(matches!(
            derive_direct_key("", "bob"),
            Err(CryptoError::KeyDerivationFailed { reason }) if reason == "empty user id"
        ));
        assert!(matches!(
            derive_direct_key("alice", ""),
            Err(CryptoError::KeyDerivationFailed { .. })
        ));
        assert!(matches!(
            derive_group_key(""),
            Err(CryptoError::KeyDerivationFailed { reason }) if reason == "empty group id"
        ));
        assert!(matches!(
            derive_group_key_legacy("g1", ""),
            Err(CryptoError::KeyDerivationFailed { .. })
        ));
    }

    #[test]
    fn ordering_follows_utf16_code_units() {
        // U+1F600 sorts before U+FF21 in UTF-16 but after it in UTF-8
        let fullwidth = "\u{FF21}";
        let emoji = "\u{1F600}";

        assert_eq!(utf16_cmp(emoji, fullwidth), Ordering::Less);
        assert_eq!(emoji.cmp(fullwidth), Ordering::Greater);
        assert_eq!(utf16_cmp("u1", "u2"), Ordering::Less);
        assert_eq!(utf16_cmp("u1", "u1"), Ordering::Equal);
    }

    #[test]
    fn conversation_derives_matching_keys() {
        assert_eq!(
            Conversation::direct("alice", "bob").derive_key().unwrap(),
            derive_direct_key("bob", "alice").unwrap()
        );
        assert_eq!(
            Conversation::group("g1").derive_key().unwrap(),
            derive_group_key("g1").unwrap()
        );
    }
}
