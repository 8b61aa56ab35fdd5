use anyhow::anyhow;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

/// Hash a plaintext password with a fresh random salt.
pub fn hash(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Check a plaintext candidate against a stored PHC-format hash.
pub fn verify(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| anyhow!("stored password hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hashed = hash("alpine-meadows-9").expect("hashing should succeed");
        assert!(verify("alpine-meadows-9", &hashed).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hashed = hash("correct-password").expect("hashing should succeed");
        assert!(!verify("wrong-password", &hashed).expect("verify should not error"));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("same-password").unwrap();
        let b = hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert!(verify("anything", "not-a-phc-string").is_err());
    }
}
