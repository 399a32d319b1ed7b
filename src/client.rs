//! Shortener and lookup clients.
//!
//! Orchestration of the protocol: draw secrets, derive, encrypt, submit
//! on one side; parse, fetch, derive, decrypt on the other. A fresh
//! (password, salt, nonce) triple is drawn for every shorten call, so a
//! nonce is never reused under any key no matter how often one client
//! instance is used.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use zeroize::Zeroize;

use crate::codec::{self, Identifier};
use crate::crypto::{self, KdfParams, NONCE_BYTES, PASS_BYTES, SALT_BYTES};
use crate::entropy::{EntropySource, OsEntropy};
use crate::error::Error;
use crate::record::PrivateUrl;
use crate::storage::StorageBackend;

/// Character separating identifier and secret segment. Chosen so the
/// secret rides in a URL fragment, which browsers never transmit.
pub const LINK_DELIMITER: char = '#';

/// Records outlive their creation by this much unless overridden.
const DEFAULT_EXPIRY_DAYS: i64 = 364;

fn default_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::days(DEFAULT_EXPIRY_DAYS)
}

/// A complete short link: server-known identifier plus the client-held
/// secret segment. Renders as `<identifier>#<secret>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    identifier: Identifier,
    secret: String,
}

impl ShortLink {
    /// Split a textual link into its two halves, validating both.
    pub fn parse(link: &str) -> Result<Self, Error> {
        let (identifier, secret) = link
            .split_once(LINK_DELIMITER)
            .ok_or(Error::MalformedIdentifier { reason: "missing delimiter" })?;
        let identifier = Identifier::new(identifier)?;
        // Reject garbage early; the password itself is only needed at
        // lookup time.
        codec::decode_secret(secret)?;
        Ok(Self { identifier, secret: secret.to_string() })
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The encoded password. Never send this to the storage service.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Display for ShortLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.identifier, LINK_DELIMITER, self.secret)
    }
}

/// Creates blinded records. One instance may shorten any number of
/// URLs; secret material is drawn fresh per call and discarded.
pub struct ShortenerClient {
    storage: Arc<dyn StorageBackend>,
    entropy: Box<dyn EntropySource>,
    kdf: KdfParams,
    expiry: DateTime<Utc>,
}

impl ShortenerClient {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            entropy: Box::new(OsEntropy),
            kdf: KdfParams::default(),
            expiry: default_expiry(),
        }
    }

    /// Substitute the entropy source. Tests only; production always
    /// uses the OS CSPRNG.
    pub fn with_entropy(mut self, entropy: Box<dyn EntropySource>) -> Self {
        self.entropy = entropy;
        self
    }

    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// When storage may discard records created by this client.
    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    pub fn set_expiry(&mut self, expiry: DateTime<Utc>) {
        self.expiry = expiry;
    }

    /// Shorten a URL: encrypt it under freshly drawn secrets, submit
    /// the blinded record, and assemble the short link. The password
    /// survives only inside the returned link's secret segment.
    pub async fn shorten(&mut self, url: &str) -> Result<ShortLink, Error> {
        let mut password = [0u8; PASS_BYTES];
        let mut salt = [0u8; SALT_BYTES];
        let mut nonce = [0u8; NONCE_BYTES];
        self.entropy.fill(&mut password);
        self.entropy.fill(&mut salt);
        self.entropy.fill(&mut nonce);

        let key = crypto::derive_key(&password, &salt, &nonce, &self.kdf)?;
        let ciphertext = crypto::encrypt(&key, &nonce, url.as_bytes());
        drop(key);

        let record = PrivateUrl {
            salt: salt.to_vec(),
            nonce: nonce.to_vec(),
            ciphertext,
        };
        let identifier = self.storage.create(&record.encode()?, self.expiry).await?;

        let secret = codec::encode_secret(&password);
        password.zeroize();

        debug!(identifier = %identifier, expiry = %self.expiry, "URL shortened");
        Ok(ShortLink { identifier, secret })
    }
}

/// Resolves a short link back to its URL. Construction validates the
/// identifier and decodes the secret segment; nothing touches the
/// network until [`lookup`](Self::lookup).
pub struct LookupClient {
    storage: Arc<dyn StorageBackend>,
    identifier: Identifier,
    password: Vec<u8>,
    kdf: KdfParams,
}

impl LookupClient {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        identifier: &str,
        encoded_password: &str,
    ) -> Result<Self, Error> {
        let identifier = Identifier::new(identifier)?;
        let password = codec::decode_secret(encoded_password)?;
        Ok(Self { storage, identifier, password, kdf: KdfParams::default() })
    }

    pub fn from_link(storage: Arc<dyn StorageBackend>, link: &ShortLink) -> Result<Self, Error> {
        Self::new(storage, link.identifier().as_str(), link.secret())
    }

    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Resolve the link. `Ok(None)` means no record exists (expired,
    /// never created, or deleted); an authentication failure on a
    /// present record propagates as [`Error::Authentication`].
    pub async fn lookup(&self) -> Result<Option<String>, Error> {
        let Some(bytes) = self.storage.fetch(&self.identifier).await? else {
            debug!(identifier = %self.identifier, "record not found");
            return Ok(None);
        };

        let record = PrivateUrl::decode(&bytes)?;
        let nonce: [u8; NONCE_BYTES] = record
            .nonce
            .as_slice()
            .try_into()
            .map_err(|_| Error::MalformedRecord { reason: "bad nonce length" })?;

        let key = crypto::derive_key(&self.password, &record.salt, &nonce, &self.kdf)?;
        let plaintext = crypto::decrypt(&key, &nonce, &record.ciphertext)?;
        let url = String::from_utf8(plaintext)
            .map_err(|_| Error::MalformedRecord { reason: "plaintext is not UTF-8" })?;
        Ok(Some(url))
    }
}

impl Drop for LookupClient {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}
