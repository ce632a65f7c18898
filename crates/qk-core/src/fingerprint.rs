//! Content fingerprints for change detection.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of a rendered document.
///
/// Two documents have equal fingerprints exactly when their bytes are equal
/// (up to hash collisions), which is all the write guard relies on.
///
/// # Examples
///
/// ```
/// use qk_core::Fingerprint;
///
/// let a = Fingerprint::of("declare module \"x\" {}\n");
/// let b = Fingerprint::of("declare module \"x\" {}\n");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprints a text document.
    #[must_use]
    pub fn of(content: &str) -> Self {
        Self::of_bytes(content.as_bytes())
    }

    /// Fingerprints raw bytes, such as a file read back from disk.
    #[must_use]
    pub fn of_bytes(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Returns the hex digest.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first eight hex digits, for log output.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
