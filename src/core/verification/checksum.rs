//! Payload checksums
//!
//! Every uploaded object's SHA-256 digest is carried in its export receipt,
//! so a partition can be compared against what was written.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `data` (64 characters)
///
/// # Examples
///
/// ```
/// use gridload::core::verification::checksum::calculate_checksum;
///
/// let checksum = calculate_checksum(b"280.15\n");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
