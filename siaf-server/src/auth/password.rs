//! Password hashing (argon2) and the password policy

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords rejected when contained anywhere in the candidate (case-insensitive)
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "12345678",
    "qwerty",
    "admin123",
    "password123",
    "hotel123",
    "beachscape",
];

/// Every rule the password violates, in a fixed order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct PasswordPolicyError(pub Vec<String>);

impl From<PasswordPolicyError> for shared::AppError {
    fn from(err: PasswordPolicyError) -> Self {
        shared::AppError::with_message(shared::ErrorCode::PasswordTooWeak, err.to_string())
            .with_detail("errors", err.0)
    }
}

/// Check a password against the policy
pub fn validate_password(password: &str) -> Result<(), PasswordPolicyError> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Debe contener al menos una mayúscula".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Debe contener al menos una minúscula".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Debe contener al menos un número".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.iter().any(|common| lowered.contains(common)) {
        errors.push("Contraseña demasiado común. Elige una más segura".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PasswordPolicyError(errors))
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Random password that satisfies [`validate_password`]
///
/// Used for the first-run administrator when no password is configured.
pub fn generate_password(length: usize) -> String {
    const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
    const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
    const DIGITS: &[u8] = b"23456789";
    const ALL: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

    let length = length.max(MIN_PASSWORD_LENGTH);
    let mut rng = rand::thread_rng();
    loop {
        let mut chars: Vec<u8> = vec![
            UPPER[rng.gen_range(0..UPPER.len())],
            LOWER[rng.gen_range(0..LOWER.len())],
            DIGITS[rng.gen_range(0..DIGITS.len())],
        ];
        while chars.len() < length {
            chars.push(ALL[rng.gen_range(0..ALL.len())]);
        }
        // Fisher-Yates
        for i in (1..chars.len()).rev() {
            let j = rng.gen_range(0..=i);
            chars.swap(i, j);
        }
        let candidate: String = chars.into_iter().map(char::from).collect();
        if validate_password(&candidate).is_ok() {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Kinha2025").is_ok());
    }

    #[test]
    fn test_reports_every_violation() {
        let err = validate_password("abc").unwrap_err();
        // too short, no uppercase, no digit
        assert_eq!(err.0.len(), 3);
        assert!(err.0[0].contains("8 caracteres"));
    }

    #[test]
    fn test_common_password_is_rejected_case_insensitively() {
        let err = validate_password("BeachScape2024").unwrap_err();
        assert_eq!(err.0, vec!["Contraseña demasiado común. Elige una más segura"]);

        assert!(validate_password("Password123").is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Kinha2025").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Kinha2025", &hash));
        assert!(!verify_password("kinha2025", &hash));
        assert!(!verify_password("Kinha2025", "not-a-hash"));
    }

    #[test]
    fn test_generated_password_passes_policy() {
        for _ in 0..20 {
            let pwd = generate_password(16);
            assert_eq!(pwd.len(), 16);
            assert!(validate_password(&pwd).is_ok(), "{pwd}");
        }
    }

    #[test]
    fn test_policy_error_maps_to_password_too_weak() {
        let err: shared::AppError = validate_password("short").unwrap_err().into();
        assert_eq!(err.code, shared::ErrorCode::PasswordTooWeak);
        assert!(err.details.unwrap().contains_key("errors"));
    }
}
