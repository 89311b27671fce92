//! Key agreement using ECDH on P-256
//!
//! Each participant holds a long-lived [`KeyPair`]. Public keys travel as
//! base64 SPKI DER and live in a public-key directory; private keys stay on
//! the owner's device. Two parties derive the same [`SymmetricKey`] from
//! their own private key and the other's public key.
//!
//! # Security
//!
//! - Only the holders of the two private keys can compute the shared secret
//! - The AES key is the x-coordinate of the shared point, with no further
//!   KDF pass, matching WebCrypto `deriveKey` for ECDH to AES-GCM-256
//! - Private key exports are wrapped in `Zeroizing`

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use p256::{
    SecretKey,
    ecdh::diffie_hellman,
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey},
};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroizing;

use crate::{
    error::{CryptoError, Result},
    key::{KEY_SIZE, SymmetricKey},
};

/// A participant's P-256 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(p256::PublicKey);

impl PublicKey {
    /// Base64 SPKI DER encoding for the public-key directory.
    pub fn to_spki_base64(&self) -> Result<String> {
        let der = self.0.to_public_key_der().map_err(|e| CryptoError::KeyAgreementFailed {
            reason: format!("SPKI encoding failed: {e}"),
        })?;
        Ok(STANDARD.encode(der.as_bytes()))
    }

    /// Parse a base64 SPKI DER public key.
    pub fn from_spki_base64(encoded: &str) -> Result<Self> {
        let der = STANDARD.decode(encoded.trim()).map_err(|e| CryptoError::KeyAgreementFailed {
            reason: format!("public key is not base64: {e}"),
        })?;
        let key = p256::PublicKey::from_public_key_der(&der).map_err(|e| {
            CryptoError::KeyAgreementFailed { reason: format!("invalid P-256 SPKI: {e}") }
        })?;
        Ok(Self(key))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_spki_base64() {
            Ok(encoded) => f.debug_tuple("PublicKey").field(&encoded).finish(),
            Err(_) => f.write_str("PublicKey(<unencodable>)"),
        }
    }
}

/// A participant's P-256 key pair.
///
/// The private half is zeroized on drop and only leaves this type through
/// [`KeyPair::export_private_key`].
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    fn from_secret(secret: SecretKey) -> Self {
        let public = PublicKey(secret.public_key());
        Self { secret, public }
    }

    /// Public half, for publishing.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Base64 PKCS#8 DER encoding of the private key, for on-device storage.
    pub fn export_private_key(&self) -> Result<Zeroizing<String>> {
        let der = self.secret.to_pkcs8_der().map_err(|e| CryptoError::KeyAgreementFailed {
            reason: format!("PKCS#8 encoding failed: {e}"),
        })?;
        Ok(Zeroizing::new(STANDARD.encode(der.as_bytes())))
    }

    /// Restore a key pair from [`KeyPair::export_private_key`] output.
    pub fn import_private_key(encoded: &str) -> Result<Self> {
        let der = Zeroizing::new(STANDARD.decode(encoded.trim()).map_err(|e| {
            CryptoError::KeyAgreementFailed { reason: format!("private key is not base64: {e}") }
        })?);
        let secret = SecretKey::from_pkcs8_der(&der).map_err(|e| {
            CryptoError::KeyAgreementFailed { reason: format!("invalid P-256 PKCS#8: {e}") }
        })?;
        Ok(Self::from_secret(secret))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Generate a fresh P-256 key pair from the OS RNG.
///
/// # Errors
///
/// - `KeyAgreementFailed`: the OS RNG is unavailable
pub fn generate_key_pair() -> Result<KeyPair> {
    let mut candidate = Zeroizing::new([0u8; KEY_SIZE]);

    // Rejection sampling: a candidate is out of range with probability ~2^-32
    loop {
        OsRng.try_fill_bytes(&mut candidate[..]).map_err(|e| CryptoError::KeyAgreementFailed {
            reason: format!("OS RNG unavailable: {e}"),
        })?;

        if let Ok(secret) = SecretKey::from_slice(&candidate[..]) {
            tracing::debug!("generated key agreement key pair");
            return Ok(KeyPair::from_secret(secret));
        }
    }
}

/// Encode a public key for the public-key directory.
pub fn export_public_key(public_key: &PublicKey) -> Result<String> {
    public_key.to_spki_base64()
}

/// Decode a public key fetched from the public-key directory.
///
/// # Errors
///
/// - `KeyAgreementFailed`: not base64, not SPKI, or not a P-256 point
pub fn import_public_key(encoded: &str) -> Result<PublicKey> {
    PublicKey::from_spki_base64(encoded)
}

/// ECDH between our private key and their public key.
///
/// `derive_shared_secret(a, b.public) == derive_shared_secret(b, a.public)`.
pub fn derive_shared_secret(mine: &KeyPair, theirs: &PublicKey) -> SymmetricKey {
    let shared = diffie_hellman(mine.secret.to_nonzero_scalar(), theirs.0.as_affine());

    let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
    bytes.copy_from_slice(shared.raw_secret_bytes());
    tracing::debug!("derived key agreement secret");

    SymmetricKey::from_bytes(*bytes)
}
