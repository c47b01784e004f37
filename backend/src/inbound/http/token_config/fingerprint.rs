//! Token secret fingerprinting.
//!
//! Operators compare the logged fingerprint across replicas to confirm they
//! share a signing secret without exposing it.

use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// First 8 bytes of the SHA-256 digest of `secret`, as lowercase hex.
///
/// # Examples
///
/// ```rust
/// use nightlist::inbound::http::token_config::fingerprint::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"0123456789abcdef0123456789abcdef");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_stable_per_secret() {
        assert_eq!(secret_fingerprint(&[b'a'; 32]), secret_fingerprint(&[b'a'; 32]));
        assert_ne!(secret_fingerprint(&[b'a'; 32]), secret_fingerprint(&[b'b'; 32]));
    }

    #[rstest]
    fn fingerprint_is_lowercase_hex() {
        let fp = secret_fingerprint(b"secret");
        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert_eq!(fp, fp.to_lowercase());
    }
}
