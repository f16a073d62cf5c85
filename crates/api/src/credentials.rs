// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Random credential generation for captains and auto-enrolled teammates,
//! plus the argon2 hashing used everywhere a password is persisted.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use rand::RngCore;
use rand_core::OsRng;

/// Random password for a newly created account. Hex over 12 random bytes;
/// the plaintext goes into the pending-registration record for delivery,
/// only the hash reaches the `users` table.
pub fn generate_password() -> String {
    let mut buf = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Random username for an auto-enrolled teammate. Stays within the
/// allowed-character policy since it lands in the unique `username` column.
pub fn generate_username() -> String {
    let mut buf = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut buf);
    let suffix: String = buf.iter().map(|b| format!("{:02x}", b)).collect();
    format!("user_{suffix}")
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::is_valid_identifier_text;
    use argon2::{PasswordVerifier, password_hash::PasswordHash};

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password();
        assert_eq!(password.len(), 24);
        assert!(password.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(password, generate_password());
    }

    #[test]
    fn test_generated_username_passes_validator() {
        for _ in 0..16 {
            let username = generate_username();
            assert!(is_valid_identifier_text(&username), "{username:?}");
        }
    }

    #[test]
    fn test_hash_verifies_and_hides_plaintext() {
        let password = generate_password();
        let hash = hash_password(&password).expect("hashing failed");
        assert!(!hash.contains(&password));
        let parsed = PasswordHash::new(&hash).expect("invalid hash format");
        assert!(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        );
    }
}
