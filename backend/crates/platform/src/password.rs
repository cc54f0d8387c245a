//! Password Hashing and Verification
//!
//! - Argon2id hashing with a per-hash random salt (PHC string output)
//! - Zeroization of clear text passwords
//! - Strength predicate (length + character classes)
//!
//! Parameters are encoded in every PHC string, so hashes produced with older
//! cost settings keep verifying after the defaults change.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length (code points)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (code points)
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password needs an upper-case letter, a lower-case letter, a digit and a symbol")]
    MissingCharacterClass,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    #[error("Hashing task aborted")]
    TaskAborted,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`; `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Wrap raw input after NFKC normalization. No policy is applied here so
    /// that login can still verify passwords created under older rules.
    pub fn new(raw: impl Into<String>) -> Self {
        let mut raw = raw.into();
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    /// Wrap and enforce the strength policy.
    pub fn new_strong(raw: impl Into<String>) -> Result<Self, PasswordPolicyError> {
        let password = Self::new(raw);
        check_strength(&password.0)?;
        Ok(password)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_strong(&self) -> bool {
        check_strength(&self.0).is_ok()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format (algorithm, version, params, salt, hash).
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Password Service
// ============================================================================

/// Hash / verify / strength operations with an optional application pepper.
#[derive(Clone)]
pub struct PasswordService {
    pepper: Option<Zeroizing<Vec<u8>>>,
    params: Params,
}

impl fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordService")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish()
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PasswordService {
    /// OWASP recommended Argon2id parameters: m=19456 (19 MiB), t=2, p=1
    pub fn new(pepper: Option<Vec<u8>>) -> Self {
        Self {
            pepper: pepper.map(Zeroizing::new),
            params: Params::default(),
        }
    }

    /// Cheaper parameters for tests. Falls back to the defaults if rejected.
    pub fn with_cost(mut self, memory_kib: u32, iterations: u32) -> Self {
        if let Ok(params) = Params::new(memory_kib, iterations, 1, None) {
            self.params = params;
        }
        self
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, password: &ClearTextPassword) -> Zeroizing<Vec<u8>> {
        let mut bytes = password.as_bytes().to_vec();
        if let Some(pepper) = &self.pepper {
            bytes.extend_from_slice(pepper);
        }
        Zeroizing::new(bytes)
    }

    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let bytes = self.peppered(password);
        let hash = self
            .argon2()
            .hash_password(&bytes, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    /// Constant-time verification. Params are read from the stored hash.
    pub fn verify(&self, hashed: &HashedPassword, password: &ClearTextPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed.as_phc_string()) else {
            return false;
        };
        let bytes = self.peppered(password);
        Argon2::default().verify_password(&bytes, &parsed).is_ok()
    }

    pub fn is_strong(&self, password: &ClearTextPassword) -> bool {
        password.is_strong()
    }

    /// [`Self::hash`] on the blocking pool.
    pub async fn hash_async(
        &self,
        password: ClearTextPassword,
    ) -> Result<HashedPassword, PasswordHashError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|_| PasswordHashError::TaskAborted)?
    }

    /// [`Self::verify`] on the blocking pool. A panicked task counts as a mismatch.
    pub async fn verify_async(&self, hashed: HashedPassword, password: ClearTextPassword) -> bool {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.verify(&hashed, &password))
            .await
            .unwrap_or(false)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn check_strength(password: &str) -> Result<(), PasswordPolicyError> {
    let char_count = password.chars().count();
    if char_count < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: char_count,
        });
    }
    if char_count > MAX_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooLong {
            max: MAX_PASSWORD_LENGTH,
            actual: char_count,
        });
    }
    if password
        .chars()
        .any(|c| c.is_control() && c != '\t' && c != '\n')
    {
        return Err(PasswordPolicyError::InvalidCharacter);
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        Err(PasswordPolicyError::MissingCharacterClass)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_service(pepper: Option<&[u8]>) -> PasswordService {
        PasswordService::new(pepper.map(<[u8]>::to_vec)).with_cost(1024, 1)
    }

    #[test]
    fn test_strength_accepts_all_classes() {
        assert!(ClearTextPassword::new("Pw0!abcd").is_strong());
        assert!(ClearTextPassword::new_strong("MySecure#Pass2024!").is_ok());
    }

    #[test]
    fn test_strength_length_boundary() {
        // 7 characters, every class present
        let result = ClearTextPassword::new_strong("Pw0!abc");
        assert!(matches!(
            result,
            Err(PasswordPolicyError::TooShort { min: 8, actual: 7 })
        ));

        let long_password = format!("Aa1!{}", "a".repeat(MAX_PASSWORD_LENGTH));
        assert!(matches!(
            ClearTextPassword::new_strong(long_password),
            Err(PasswordPolicyError::TooLong { .. })
        ));
    }

    #[test]
    fn test_strength_requires_each_class() {
        for weak in ["pw0!abcd", "PW0!ABCD", "Pwx!abcd", "Pw0xabcd"] {
            assert!(
                matches!(
                    ClearTextPassword::new_strong(weak),
                    Err(PasswordPolicyError::MissingCharacterClass)
                ),
                "{weak} should be weak"
            );
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let service = fast_service(None);
        let password = ClearTextPassword::new("TestPassword123!");
        let hashed = service.hash(&password).unwrap();

        assert!(service.verify(&hashed, &password));
        assert!(!service.verify(&hashed, &ClearTextPassword::new("WrongPassword123!")));
    }

    #[test]
    fn test_salt_is_per_hash() {
        let service = fast_service(None);
        let password = ClearTextPassword::new("TestPassword123!");
        let a = service.hash(&password).unwrap();
        let b = service.hash(&password).unwrap();
        assert_ne!(a.as_phc_string(), b.as_phc_string());
    }

    #[test]
    fn test_hash_with_pepper() {
        let peppered = fast_service(Some(b"my_secret_pepper"));
        let password = ClearTextPassword::new("TestPassword123!");
        let hashed = peppered.hash(&password).unwrap();

        assert!(peppered.verify(&hashed, &password));
        assert!(!fast_service(None).verify(&hashed, &password));
        assert!(!fast_service(Some(b"wrong_pepper")).verify(&hashed, &password));
    }

    #[test]
    fn test_old_cost_parameters_still_verify() {
        let password = ClearTextPassword::new("TestPassword123!");
        let old = fast_service(None).with_cost(2048, 2).hash(&password).unwrap();
        assert!(fast_service(None).verify(&old, &password));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let service = fast_service(None);
        let password = ClearTextPassword::new("TestPassword123!");
        let hashed = service.hash(&password).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(service.verify(&restored, &password));
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new("secret-value");
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret-value"));

        let service = fast_service(Some(b"pepper-value"));
        assert!(!format!("{:?}", service).contains("pepper-value"));
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let service = fast_service(None);
        let hashed = service
            .hash_async(ClearTextPassword::new("Pw0!abcd"))
            .await
            .unwrap();
        assert!(
            service
                .verify_async(hashed.clone(), ClearTextPassword::new("Pw0!abcd"))
                .await
        );
        assert!(
            !service
                .verify_async(hashed, ClearTextPassword::new("Pw0!abce"))
                .await
        );
    }
}
