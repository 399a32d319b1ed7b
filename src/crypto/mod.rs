//! Cryptographic core — AES-256-GCM with Argon2id KDF.
//!
//! URLs are encrypted client-side before anything touches the network.
//! The key is derived from a random password plus the record's salt and
//! nonce, so any party holding the (password, salt, nonce) triple can
//! reproduce it deterministically. Key material is zeroized after use.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Error;

/// Length of the random password drawn per record.
pub const PASS_BYTES: usize = 32;
/// Length of the per-record salt.
pub const SALT_BYTES: usize = 32;
/// Length of the AES-GCM nonce (96 bits).
pub const NONCE_BYTES: usize = 12;
/// Length of the derived AES-256 key.
pub const KEY_BYTES: usize = 32;

/// Argon2id work factor. The defaults mirror the argon2 crate's own;
/// tests use [`KdfParams::new`] with lighter values.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of passes.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl KdfParams {
    pub fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self { m_cost, t_cost, p_cost }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

/// A derived AES-256 key. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_BYTES]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }
}

/// Derive a 256-bit key from (password, salt, nonce) with Argon2id.
///
/// Deterministic and pure: identical inputs always yield the identical
/// key, which is what lets a lookup reproduce the key from the stored
/// salt/nonce and the out-of-band password. The nonce is folded into
/// the KDF salt so a single flipped bit anywhere in the triple produces
/// an unrelated key.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    nonce: &[u8],
    params: &KdfParams,
) -> Result<DerivedKey, Error> {
    if password.len() != PASS_BYTES {
        return Err(Error::KeyDerivation { reason: "wrong password length" });
    }
    if salt.len() != SALT_BYTES {
        return Err(Error::KeyDerivation { reason: "wrong salt length" });
    }
    if nonce.len() != NONCE_BYTES {
        return Err(Error::KeyDerivation { reason: "wrong nonce length" });
    }

    let argon_params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_BYTES))
        .map_err(|_| Error::KeyDerivation { reason: "invalid work factor" })?;
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut kdf_salt = [0u8; SALT_BYTES + NONCE_BYTES];
    kdf_salt[..SALT_BYTES].copy_from_slice(salt);
    kdf_salt[SALT_BYTES..].copy_from_slice(nonce);

    let mut key = [0u8; KEY_BYTES];
    argon
        .hash_password_into(password, &kdf_salt, &mut key)
        .map_err(|_| Error::KeyDerivation { reason: "argon2 failure" })?;

    kdf_salt.zeroize();
    Ok(DerivedKey(key))
}

/// Encrypt plaintext with AES-256-GCM under (key, nonce).
///
/// The nonce must be drawn fresh from the entropy source for every
/// encryption; it is never derived from the content.
pub fn encrypt(key: &DerivedKey, nonce: &[u8; NONCE_BYTES], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).expect("key length");
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .expect("AES-GCM encryption failed")
}

/// Decrypt ciphertext produced by [`encrypt`].
///
/// Fails with [`Error::Authentication`] when the tag does not verify:
/// wrong key, wrong nonce, or a tampered record. Distinguishable from a
/// transport-level "not found".
pub fn decrypt(
    key: &DerivedKey,
    nonce: &[u8; NONCE_BYTES],
    ciphertext: &[u8],
) -> Result<Vec<u8>, Error> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).expect("key length");
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Full-strength Argon2id is deliberately slow; keep tests fast.
    fn light_params() -> KdfParams {
        KdfParams::new(256, 1, 1)
    }

    #[test]
    fn test_derive_is_deterministic() {
        let pass = [7u8; PASS_BYTES];
        let salt = [1u8; SALT_BYTES];
        let nonce = [2u8; NONCE_BYTES];

        let k1 = derive_key(&pass, &salt, &nonce, &light_params()).unwrap();
        let k2 = derive_key(&pass, &salt, &nonce, &light_params()).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_rejects_wrong_lengths() {
        let pass = [7u8; PASS_BYTES];
        let salt = [1u8; SALT_BYTES];
        let nonce = [2u8; NONCE_BYTES];

        assert!(matches!(
            derive_key(&pass[..16], &salt, &nonce, &light_params()),
            Err(Error::KeyDerivation { .. })
        ));
        assert!(matches!(
            derive_key(&pass, &salt[..8], &nonce, &light_params()),
            Err(Error::KeyDerivation { .. })
        ));
        assert!(matches!(
            derive_key(&pass, &salt, &nonce[..4], &light_params()),
            Err(Error::KeyDerivation { .. })
        ));
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let pass = [9u8; PASS_BYTES];
        let salt = [4u8; SALT_BYTES];
        let nonce = [5u8; NONCE_BYTES];
        let key = derive_key(&pass, &salt, &nonce, &light_params()).unwrap();

        let url = b"https://en.wikipedia.org/wiki/Main_Page";
        let ciphertext = encrypt(&key, &nonce, url);
        assert_ne!(&ciphertext[..], &url[..]);

        let plaintext = decrypt(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(plaintext, url);
    }

    #[test]
    fn test_single_bit_flip_in_any_input_fails_authentication() {
        let pass = [9u8; PASS_BYTES];
        let salt = [4u8; SALT_BYTES];
        let nonce = [5u8; NONCE_BYTES];
        let key = derive_key(&pass, &salt, &nonce, &light_params()).unwrap();
        let ciphertext = encrypt(&key, &nonce, b"https://example.com");

        let mut bad_pass = pass;
        bad_pass[0] ^= 0x01;
        let k = derive_key(&bad_pass, &salt, &nonce, &light_params()).unwrap();
        assert!(matches!(decrypt(&k, &nonce, &ciphertext), Err(Error::Authentication)));

        let mut bad_salt = salt;
        bad_salt[31] ^= 0x80;
        let k = derive_key(&pass, &bad_salt, &nonce, &light_params()).unwrap();
        assert!(matches!(decrypt(&k, &nonce, &ciphertext), Err(Error::Authentication)));

        let mut bad_nonce = nonce;
        bad_nonce[3] ^= 0x10;
        let k = derive_key(&pass, &salt, &bad_nonce, &light_params()).unwrap();
        assert!(matches!(decrypt(&k, &bad_nonce, &ciphertext), Err(Error::Authentication)));
    }

    #[test]
    fn test_tampered_ciphertext_fails_authentication() {
        let pass = [3u8; PASS_BYTES];
        let salt = [6u8; SALT_BYTES];
        let nonce = [1u8; NONCE_BYTES];
        let key = derive_key(&pass, &salt, &nonce, &light_params()).unwrap();

        let mut ciphertext = encrypt(&key, &nonce, b"https://example.com");
        ciphertext[0] ^= 0xFF;
        assert!(matches!(decrypt(&key, &nonce, &ciphertext), Err(Error::Authentication)));
    }

    #[test]
    fn test_empty_plaintext_roundtrips() {
        // An empty URL is still a valid plaintext; decryption succeeding
        // with empty output must stay distinguishable from "not found",
        // which the lookup layer models as Ok(None).
        let pass = [3u8; PASS_BYTES];
        let salt = [6u8; SALT_BYTES];
        let nonce = [1u8; NONCE_BYTES];
        let key = derive_key(&pass, &salt, &nonce, &light_params()).unwrap();

        let ciphertext = encrypt(&key, &nonce, b"");
        assert_eq!(decrypt(&key, &nonce, &ciphertext).unwrap(), b"");
    }
}
