//! End-to-end protocol scenarios against the in-memory backend.

use std::sync::Arc;

use chrono::{Duration, Utc};

use blindlink::client::{LookupClient, ShortLink, ShortenerClient};
use blindlink::codec;
use blindlink::crypto::{KdfParams, PASS_BYTES};
use blindlink::entropy::EntropySource;
use blindlink::error::Error;
use blindlink::storage::{MemoryStorage, StorageBackend};

/// Deterministic entropy so failures reproduce byte for byte.
struct SeededEntropy(u64);

impl EntropySource for SeededEntropy {
    fn fill(&mut self, dest: &mut [u8]) {
        // xorshift64, good enough for test vectors.
        for byte in dest {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            *byte = self.0 as u8;
        }
    }
}

fn light_kdf() -> KdfParams {
    KdfParams::new(256, 1, 1)
}

fn shortener(storage: Arc<MemoryStorage>, seed: u64) -> ShortenerClient {
    ShortenerClient::new(storage)
        .with_kdf_params(light_kdf())
        .with_entropy(Box::new(SeededEntropy(seed)))
}

#[tokio::test]
async fn shorten_and_resolve_wikipedia_main_page() {
    let storage = Arc::new(MemoryStorage::new());
    let mut client = shortener(storage.clone(), 0x1234_5678);

    let url = "https://en.wikipedia.org/wiki/Main_Page";
    let link = client.shorten(url).await.unwrap();

    // Re-parse from the rendered form, as a browser would.
    let rendered = link.to_string();
    let parsed = ShortLink::parse(&rendered).unwrap();

    let lookup = LookupClient::from_link(storage, &parsed)
        .unwrap()
        .with_kdf_params(light_kdf());
    assert_eq!(lookup.lookup().await.unwrap().as_deref(), Some(url));
}

#[tokio::test]
async fn nonexistent_identifier_resolves_to_none() {
    let storage = Arc::new(MemoryStorage::new());
    let secret = codec::encode_secret(&[7u8; PASS_BYTES]);

    // Syntactically valid identifier that was never created.
    let lookup = LookupClient::new(storage, "zzzzzzz", &secret)
        .unwrap()
        .with_kdf_params(light_kdf());
    assert!(lookup.lookup().await.unwrap().is_none());
}

#[tokio::test]
async fn wrong_secret_fails_authentication() {
    let storage = Arc::new(MemoryStorage::new());
    let mut client = shortener(storage.clone(), 0xAB);

    let link = client.shorten("https://example.com/private").await.unwrap();

    let wrong_secret = codec::encode_secret(&[0u8; PASS_BYTES]);
    assert_ne!(wrong_secret, link.secret());

    let lookup = LookupClient::new(storage, link.identifier().as_str(), &wrong_secret)
        .unwrap()
        .with_kdf_params(light_kdf());
    assert!(matches!(lookup.lookup().await, Err(Error::Authentication)));
}

#[tokio::test]
async fn rate_limited_creation_is_distinguished() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_rate_limited(true);

    let mut client = shortener(storage.clone(), 1);
    let err = client.shorten("https://example.com").await.unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(err.status_code(), Some(429));

    let err = storage
        .create_plaintext("captcha-token", "https://example.com")
        .await
        .unwrap_err();
    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn same_url_twice_yields_unrelated_links() {
    let storage = Arc::new(MemoryStorage::new());
    let mut client = shortener(storage.clone(), 42);

    let url = "https://example.com/same";
    let a = client.shorten(url).await.unwrap();
    let b = client.shorten(url).await.unwrap();

    assert_ne!(a.identifier(), b.identifier());
    assert_ne!(a.secret(), b.secret());

    let rec_a = storage.fetch(a.identifier()).await.unwrap().unwrap();
    let rec_b = storage.fetch(b.identifier()).await.unwrap().unwrap();
    assert_ne!(rec_a, rec_b);
}

#[tokio::test]
async fn expired_record_is_gone() {
    let storage = Arc::new(MemoryStorage::new());
    let mut client = shortener(storage.clone(), 9);
    client.set_expiry(Utc::now() - Duration::seconds(1));

    let link = client.shorten("https://example.com/ephemeral").await.unwrap();

    let lookup = LookupClient::from_link(storage, &link)
        .unwrap()
        .with_kdf_params(light_kdf());
    assert!(lookup.lookup().await.unwrap().is_none());
}

#[test]
fn over_long_identifier_never_reaches_the_network() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let secret = codec::encode_secret(&[1u8; PASS_BYTES]);
    let eleven_chars = "a".repeat(11);

    // Construction fails; no async lookup can even be attempted.
    assert!(matches!(
        LookupClient::new(storage, &eleven_chars, &secret),
        Err(Error::MalformedIdentifier { .. })
    ));
}

#[test]
fn default_expiry_is_364_days_from_now() {
    let storage = Arc::new(MemoryStorage::new());
    let client = ShortenerClient::new(storage);

    let expected = Utc::now() + Duration::days(364);
    let delta = (client.expiry() - expected).num_seconds().abs();
    assert!(delta <= 5, "default expiry off by {delta}s");
}
