use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

/// A freshly minted password-reset token. The plaintext goes to the user by
/// mail; only the hash and expiry are ever persisted, so a database read
/// alone cannot impersonate anyone.
pub struct ResetToken {
    pub plaintext: String,
    pub hash: String,
    pub expires_at: OffsetDateTime,
}

pub fn generate(ttl_minutes: i64) -> ResetToken {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let plaintext = hex::encode(bytes);
    let hash = hash_token(&plaintext);
    ResetToken {
        plaintext,
        hash,
        expires_at: OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes),
    }
}

/// Deterministic lookup hash. Reset tokens are compared hash-to-hash, never
/// plaintext-to-hash.
pub fn hash_token(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_is_high_entropy_hex() {
        let token = generate(10);
        assert_eq!(token.plaintext.len(), 64);
        assert!(token.plaintext.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn stored_hash_is_not_the_plaintext() {
        let token = generate(10);
        assert_ne!(token.hash, token.plaintext);
        assert_eq!(token.hash.len(), 64);
    }

    #[test]
    fn hash_is_deterministic() {
        let token = generate(10);
        assert_eq!(hash_token(&token.plaintext), token.hash);
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate(10).plaintext, generate(10).plaintext);
    }

    #[test]
    fn expiry_is_in_the_future() {
        let token = generate(10);
        let now = OffsetDateTime::now_utc();
        assert!(token.expires_at > now);
        assert!(token.expires_at <= now + Duration::minutes(11));
    }
}
