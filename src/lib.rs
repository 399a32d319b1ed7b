//! blindlink — zero-knowledge URL shortener client.
//!
//! The storage service only ever sees a "blinded" record: ciphertext,
//! a salt and a nonce. The decryption password travels exclusively in
//! the fragment of the short link (`<identifier>#<secret>`), which
//! browsers never send to the server. Losing the link means losing the
//! URL; the operator cannot recover it either.
//!
//! Security:
//! - URLs encrypted client-side (AES-256-GCM + Argon2id)
//! - Password, salt and nonce drawn fresh per shorten call
//! - Key material zeroized after use
//! - Secret segment never crosses the network boundary

pub mod client;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod entropy;
pub mod error;
pub mod record;
pub mod storage;

pub use client::{LookupClient, ShortLink, ShortenerClient};
pub use codec::Identifier;
pub use config::Config;
pub use error::Error;
pub use record::PrivateUrl;
pub use storage::StorageBackend;
