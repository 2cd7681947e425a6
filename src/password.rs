//! Password policy and the one-way hash used to store password verifiers.
//!
//! The policy applies only when a password is being *set* (registration and
//! password change). Login input is compared against the stored hash as-is.

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::{LimitsConfig, SecurityConfig};
use crate::constants::{labels, limits};
use crate::validation::ValidationError;

/// Inclusive length bounds for new passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_len: limits::MIN_PASSWORD_LENGTH,
            max_len: limits::MAX_PASSWORD_LENGTH,
        }
    }
}

impl From<&LimitsConfig> for PasswordPolicy {
    fn from(cfg: &LimitsConfig) -> Self {
        Self {
            min_len: cfg.min_password_length,
            max_len: cfg.max_password_length,
        }
    }
}

impl PasswordPolicy {
    pub fn validate(&self, password: Option<&str>, label: &'static str) -> Result<String, ValidationError> {
        validate_password(password, label, self.min_len, self.max_len)
    }

    pub fn verify_pair(
        &self,
        password: Option<&str>,
        confirmation: Option<&str>,
    ) -> Result<String, ValidationError> {
        verify_password_pair(password, confirmation, self.min_len, self.max_len)
    }
}

/// Checks a new password without trimming: whitespace is significant.
pub fn validate_password(
    password: Option<&str>,
    label: &'static str,
    min_len: usize,
    max_len: usize,
) -> Result<String, ValidationError> {
    let password = password.ok_or(ValidationError::Missing { label })?;

    if password.is_empty() {
        return Err(ValidationError::Empty { label });
    }

    let len = password.chars().count();
    if len < min_len {
        return Err(ValidationError::TooShort {
            label,
            len,
            min: min_len,
        });
    }
    if len > max_len {
        return Err(ValidationError::TooLong {
            label,
            len,
            max: max_len,
        });
    }

    Ok(password.to_string())
}

/// Validates a password and its confirmation independently, then requires
/// them to be identical. Returns the password.
pub fn verify_password_pair(
    password: Option<&str>,
    confirmation: Option<&str>,
    min_len: usize,
    max_len: usize,
) -> Result<String, ValidationError> {
    let password = validate_password(password, labels::PASSWORD, min_len, max_len)?;
    let confirmation = validate_password(confirmation, labels::VERIFY, min_len, max_len)?;

    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(password)
}

/// Hash a password using Argon2id with the configured cost parameters.
/// The result is a PHC string carrying its own salt and parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a candidate password against a stored PHC hash.
///
/// A malformed stored hash is an error, a wrong password is `Ok(false)`.
pub fn verify_password_hash(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_validate_password_bounds() {
        assert!(validate_password(Some("123456"), "password", 6, 20).is_ok());
        assert!(validate_password(Some("x".repeat(20).as_str()), "password", 6, 20).is_ok());
        assert_eq!(
            validate_password(Some("12345"), "password", 6, 20),
            Err(ValidationError::TooShort {
                label: "password",
                len: 5,
                min: 6
            })
        );
        assert_eq!(
            validate_password(Some("x".repeat(21).as_str()), "password", 6, 20),
            Err(ValidationError::TooLong {
                label: "password",
                len: 21,
                max: 20
            })
        );
    }

    #[test]
    fn test_validate_password_missing_and_empty() {
        assert_eq!(
            validate_password(None, "password", 6, 20),
            Err(ValidationError::Missing { label: "password" })
        );
        assert_eq!(
            validate_password(Some(""), "password", 6, 20),
            Err(ValidationError::Empty { label: "password" })
        );
    }

    #[test]
    fn test_validate_password_keeps_whitespace() {
        assert_eq!(
            validate_password(Some("  pass  "), "password", 6, 20).unwrap(),
            "  pass  "
        );
        // Whitespace counts toward length and is never trimmed away.
        assert!(validate_password(Some("      "), "password", 6, 20).is_ok());
    }

    #[test]
    fn test_verify_password_pair() {
        assert_eq!(
            verify_password_pair(Some("Secret1"), Some("Secret1"), 6, 20).unwrap(),
            "Secret1"
        );
        assert_eq!(
            verify_password_pair(Some("Secret1"), Some("Secret2"), 6, 20),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            verify_password_pair(Some("Secret1"), Some("Secret1 "), 6, 20),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_verify_password_pair_checks_each_side() {
        assert!(matches!(
            verify_password_pair(Some("Secret1"), None, 6, 20),
            Err(ValidationError::Missing { label: "verify" })
        ));
        assert!(matches!(
            verify_password_pair(Some("Short"), Some("Short"), 6, 20),
            Err(ValidationError::TooShort { label: "password", .. })
        ));
    }

    #[test]
    fn test_policy_from_limits() {
        let limits = LimitsConfig {
            min_password_length: 8,
            max_password_length: 64,
            ..LimitsConfig::default()
        };
        let policy = PasswordPolicy::from(&limits);
        assert!(policy.validate(Some("1234567"), "password").is_err());
        assert!(policy.validate(Some("12345678"), "password").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret1", &fast_config()).unwrap();
        assert_ne!(hash, "Secret1");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password_hash("Secret1", &hash).unwrap());
        assert!(!verify_password_hash("secret1", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("Secret1", &fast_config()).unwrap();
        let b = hash_password("Secret1", &fast_config()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password_hash("Secret1", "not-a-hash").is_err());
    }
}
