//! Job identity for scheduled transfers.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the full transfer command line.
///
/// Stored as the cron job's comment, so the same transfer always maps to the
/// same job and two different transfers never share one.
pub fn fingerprint(command: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(command.as_bytes());
    format!("{:x}", hasher.finalize())
}
