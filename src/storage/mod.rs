//! Storage collaborator boundary.
//!
//! The protocol never talks to a concrete server; it calls this trait.
//! [`HttpStorage`] is the production implementation, [`MemoryStorage`]
//! a self-contained one for tests and embedding. Implementations only
//! ever see ciphertext, salts and nonces.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::codec::Identifier;
use crate::error::Error;

pub mod http;
pub mod memory;

pub use http::HttpStorage;
pub use memory::MemoryStorage;

/// The storage service, as seen from the client.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Submit an encoded blinded record; storage may discard it after
    /// `expiry`. Returns the identifier under which it was filed.
    async fn create(
        &self,
        record_bytes: &[u8],
        expiry: DateTime<Utc>,
    ) -> Result<Identifier, Error>;

    /// Fetch a record's bytes. `Ok(None)` means no record: never
    /// created, expired, or deleted. This is a normal outcome, not an
    /// error.
    async fn fetch(&self, identifier: &Identifier) -> Result<Option<Vec<u8>>, Error>;

    /// The captcha-gated plaintext path: the server stores the URL as
    /// given, with no client-side encryption. A distinct mode with no
    /// zero-knowledge property.
    async fn create_plaintext(
        &self,
        captcha_response: &str,
        long_url: &str,
    ) -> Result<Identifier, Error>;
}
