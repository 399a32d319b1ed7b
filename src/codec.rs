//! Identifier and secret codecs.
//!
//! The identifier codec maps the storage service's numeric lookup key
//! to a compact textual slug over a fixed 58-character alphabet (no
//! `0`, `I`, `O` or `l`, so slugs survive being read aloud). It has no
//! cryptographic role. The secret codec carries the random password in
//! the fragment of the short link as URL-safe unpadded base64.
//!
//! The `#` delimiter of a short link appears in neither alphabet, so a
//! link always splits unambiguously.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::Error;

/// Slug alphabet, in digit-value order.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Upper bound on identifier length. Anything longer is rejected
/// before a lookup is attempted.
pub const MAX_IDENTIFIER_LEN: usize = 10;

const RADIX: u64 = ALPHABET.len() as u64;

/// A validated record identifier, safe to hand to the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate a textual identifier: non-empty, within the length
    /// bound, and drawn entirely from the slug alphabet.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.is_empty() {
            return Err(Error::MalformedIdentifier { reason: "empty" });
        }
        if s.len() > MAX_IDENTIFIER_LEN {
            return Err(Error::MalformedIdentifier { reason: "exceeds maximum length" });
        }
        if !s.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(Error::MalformedIdentifier { reason: "character outside alphabet" });
        }
        Ok(Self(s))
    }

    /// Encode a numeric lookup index as an identifier.
    pub fn from_index(index: u64) -> Self {
        Self(encode_identifier(index))
    }

    /// Decode back to the numeric lookup index.
    pub fn index(&self) -> Result<u64, Error> {
        decode_identifier(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quick alphabet screen, applied to anything that claims to be an
/// identifier before it is looked at further.
pub fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_IDENTIFIER_LEN
        && s.bytes().all(|b| ALPHABET.contains(&b))
}

/// Encode an index as slug digits, least-significant digit first.
pub fn encode_identifier(mut index: u64) -> String {
    let mut out = String::new();
    loop {
        out.push(ALPHABET[(index % RADIX) as usize] as char);
        index /= RADIX;
        if index == 0 {
            break;
        }
    }
    out
}

/// Inverse of [`encode_identifier`]. Rejects over-long input, symbols
/// outside the alphabet, and values that do not fit in a `u64`.
pub fn decode_identifier(s: &str) -> Result<u64, Error> {
    if s.is_empty() {
        return Err(Error::MalformedIdentifier { reason: "empty" });
    }
    if s.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::MalformedIdentifier { reason: "exceeds maximum length" });
    }

    let mut value: u64 = 0;
    let mut scale: u64 = 1;
    for (i, b) in s.bytes().enumerate() {
        let digit = ALPHABET
            .iter()
            .position(|&a| a == b)
            .ok_or(Error::MalformedIdentifier { reason: "character outside alphabet" })?
            as u64;
        value = digit
            .checked_mul(scale)
            .and_then(|v| value.checked_add(v))
            .ok_or(Error::MalformedIdentifier { reason: "index overflow" })?;
        if i + 1 < s.len() {
            scale = scale
                .checked_mul(RADIX)
                .ok_or(Error::MalformedIdentifier { reason: "index overflow" })?;
        }
    }
    Ok(value)
}

/// Encode the random password for the fragment of a short link.
pub fn encode_secret(password: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(password)
}

/// Decode the fragment of a short link back into password bytes.
pub fn decode_secret(encoded: &str) -> Result<Vec<u8>, Error> {
    URL_SAFE_NO_PAD.decode(encoded).map_err(|_| Error::MalformedSecret)
}
