//! In-memory storage backend.
//!
//! Self-contained implementation for tests and embedded use. Allocates
//! sequential indices through the identifier codec, honors expiry on
//! fetch, and can be toggled into a rate-limited state to exercise the
//! 429 path without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::codec::Identifier;
use crate::error::Error;
use crate::storage::StorageBackend;

pub struct MemoryStorage {
    records: Mutex<HashMap<u64, (Vec<u8>, DateTime<Utc>)>>,
    plain: Mutex<HashMap<u64, String>>,
    next_index: AtomicU64,
    rate_limited: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            plain: Mutex::new(HashMap::new()),
            // Start above zero so slugs are not single characters.
            next_index: AtomicU64::new(100_000),
            rate_limited: AtomicBool::new(false),
        }
    }

    /// When set, creation requests answer 429 until cleared.
    pub fn set_rate_limited(&self, limited: bool) {
        self.rate_limited.store(limited, Ordering::SeqCst);
    }

    /// Stored plaintext URL for an identifier created via the captcha
    /// path, if any.
    pub fn plaintext_url(&self, identifier: &Identifier) -> Option<String> {
        let index = identifier.index().ok()?;
        self.plain.lock().unwrap().get(&index).cloned()
    }

    fn check_rate_limit(&self) -> Result<(), Error> {
        if self.rate_limited.load(Ordering::SeqCst) {
            return Err(Error::Transport { status: 429 });
        }
        Ok(())
    }

    fn allocate(&self) -> Identifier {
        Identifier::from_index(self.next_index.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn create(
        &self,
        record_bytes: &[u8],
        expiry: DateTime<Utc>,
    ) -> Result<Identifier, Error> {
        self.check_rate_limit()?;
        let identifier = self.allocate();
        let index = identifier.index()?;
        self.records.lock().unwrap().insert(index, (record_bytes.to_vec(), expiry));
        Ok(identifier)
    }

    async fn fetch(&self, identifier: &Identifier) -> Result<Option<Vec<u8>>, Error> {
        let index = identifier.index()?;
        let mut records = self.records.lock().unwrap();
        match records.get(&index) {
            Some((_, expiry)) if *expiry <= Utc::now() => {
                // Expired records are unreachable, same as never created.
                records.remove(&index);
                Ok(None)
            }
            Some((bytes, _)) => Ok(Some(bytes.clone())),
            None => Ok(None),
        }
    }

    async fn create_plaintext(
        &self,
        _captcha_response: &str,
        long_url: &str,
    ) -> Result<Identifier, Error> {
        self.check_rate_limit()?;
        let identifier = self.allocate();
        let index = identifier.index()?;
        self.plain.lock().unwrap().insert(index, long_url.to_string());
        Ok(identifier)
    }
}
