//! Stored record wire codec.
//!
//! The only thing the storage service ever persists: salt, nonce and
//! the blinded (encrypted) URL. The layout is versioned and length-
//! prefixed so future revisions can append fields without breaking old
//! decoders; trailing bytes after the third field are ignored.
//!
//! Layout, all lengths big-endian u16:
//!   version (u8) | salt len | salt | nonce len | nonce | ct len | ct

use crate::error::Error;

/// Current record layout version.
pub const RECORD_VERSION: u8 = 1;

/// A server-opaque record. Storage persists exactly these bytes and
/// cannot derive the key or plaintext from them alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateUrl {
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl PrivateUrl {
    /// Serialize for submission to storage.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(
            1 + 3 * 2 + self.salt.len() + self.nonce.len() + self.ciphertext.len(),
        );
        out.push(RECORD_VERSION);
        for field in [&self.salt, &self.nonce, &self.ciphertext] {
            let len = u16::try_from(field.len())
                .map_err(|_| Error::MalformedRecord { reason: "field too long" })?;
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(field);
        }
        Ok(out)
    }

    /// Deserialize bytes fetched from storage.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let (&version, mut rest) = data
            .split_first()
            .ok_or(Error::MalformedRecord { reason: "empty" })?;
        if version != RECORD_VERSION {
            return Err(Error::MalformedRecord { reason: "unknown version" });
        }

        let mut read_field = || -> Result<Vec<u8>, Error> {
            if rest.len() < 2 {
                return Err(Error::MalformedRecord { reason: "truncated length" });
            }
            let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
            rest = &rest[2..];
            if rest.len() < len {
                return Err(Error::MalformedRecord { reason: "truncated field" });
            }
            let field = rest[..len].to_vec();
            rest = &rest[len..];
            Ok(field)
        };

        let salt = read_field()?;
        let nonce = read_field()?;
        let ciphertext = read_field()?;
        // Anything after the third field belongs to a future revision.
        Ok(Self { salt, nonce, ciphertext })
    }
}
