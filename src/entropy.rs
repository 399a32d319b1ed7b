//! CSPRNG capability for the client components.
//!
//! Randomness is injected rather than drawn ad hoc so that tests can
//! substitute a deterministic source. Production code always uses
//! [`OsEntropy`].

use rand::rngs::OsRng;
use rand::RngCore;

/// Source of cryptographically secure random bytes.
pub trait EntropySource: Send {
    fn fill(&mut self, dest: &mut [u8]);
}

/// The operating system CSPRNG. The only implementation that should
/// ever appear outside of tests.
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::EntropySource;

    /// Deterministic counter-based source, for tests only.
    pub struct CountingEntropy(pub u8);

    impl EntropySource for CountingEntropy {
        fn fill(&mut self, dest: &mut [u8]) {
            for byte in dest {
                *byte = self.0;
                self.0 = self.0.wrapping_add(1);
            }
        }
    }
}
