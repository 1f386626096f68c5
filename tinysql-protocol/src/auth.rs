// Copyright 2025 Tiny-SQL Contributors
// Licensed under the Apache License, Version 2.0

//! `mysql_native_password` authentication
//!
//! The server stores `SHA1(SHA1(password))` per user. The client sends
//! `SHA1(password) XOR SHA1(salt || stored_hash)`; the server XORs the
//! response back to `SHA1(password)` and checks that hashing it once more
//! reproduces the stored hash.

use sha1::{Digest, Sha1};
use tracing::{debug, warn};

const HASH_LEN: usize = 20;

pub struct Authenticator;

impl Authenticator {
    /// Verify an auth response for `username` against the 20-byte salt the
    /// handshake carried.
    pub fn authenticate(username: &str, auth_response: &[u8], salt: &[u8]) -> bool {
        let stored_hash = match Self::stored_hash(username) {
            Some(hash) => hash,
            None => {
                warn!("Unknown user: {}", username);
                return false;
            }
        };

        // An empty response claims an empty password.
        if auth_response.is_empty() {
            let empty_hash = sha1_of(&sha1_of(b""));
            return constant_time_eq(&stored_hash, &empty_hash);
        }

        if auth_response.len() != HASH_LEN {
            warn!(
                "Invalid auth response length {} from user {}",
                auth_response.len(),
                username
            );
            return false;
        }

        // SHA1(salt || stored_hash)
        let mut hasher = Sha1::new();
        hasher.update(salt);
        hasher.update(stored_hash);
        let mask: [u8; HASH_LEN] = hasher.finalize().into();

        // Unmask the response back to SHA1(password)
        let mut candidate = [0u8; HASH_LEN];
        for i in 0..HASH_LEN {
            candidate[i] = auth_response[i] ^ mask[i];
        }

        let ok = constant_time_eq(&sha1_of(&candidate), &stored_hash);
        if ok {
            debug!("Authentication successful for user: {}", username);
        } else {
            warn!("Authentication failed for user: {}", username);
        }
        ok
    }

    /// `SHA1(SHA1(password))` for the static user catalog.
    fn stored_hash(username: &str) -> Option<[u8; HASH_LEN]> {
        let password: &str = match username {
            "root" | "tiny" => "",
            "test" => "test",
            "admin" => "admin123",
            _ => return None,
        };
        Some(sha1_of(&sha1_of(password.as_bytes())))
    }
}

fn sha1_of(data: &[u8]) -> [u8; HASH_LEN] {
    Sha1::digest(data).into()
}

fn constant_time_eq(a: &[u8; HASH_LEN], b: &[u8; HASH_LEN]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handshake::scramble_password;

    const SALT: [u8; 20] = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
        0x0F, 0x10, 0x11, 0x12, 0x13, 0x14,
    ];

    #[test]
    fn test_known_users_authenticate() {
        for (user, password) in [
            ("root", ""),
            ("tiny", ""),
            ("test", "test"),
            ("admin", "admin123"),
        ] {
            let response = scramble_password(password, &SALT);
            assert!(
                Authenticator::authenticate(user, &response, &SALT),
                "user {} should authenticate",
                user
            );
        }
    }

    #[test]
    fn test_wrong_password_rejected() {
        let response = scramble_password("wrong", &SALT);
        assert!(!Authenticator::authenticate("admin", &response, &SALT));
        assert!(!Authenticator::authenticate("test", &response, &SALT));
    }

    #[test]
    fn test_unknown_user_rejected() {
        let response = scramble_password("anything", &SALT);
        assert!(!Authenticator::authenticate("nobody", &response, &SALT));
        assert!(!Authenticator::authenticate("nobody", &[], &SALT));
    }

    #[test]
    fn test_empty_response_only_matches_empty_password() {
        assert!(Authenticator::authenticate("root", &[], &SALT));
        assert!(Authenticator::authenticate("tiny", &[], &SALT));
        assert!(!Authenticator::authenticate("test", &[], &SALT));
        assert!(!Authenticator::authenticate("admin", &[], &SALT));
    }

    #[test]
    fn test_bad_response_length_rejected() {
        assert!(!Authenticator::authenticate("test", &[1, 2, 3], &SALT));
        assert!(!Authenticator::authenticate("test", &[0u8; 21], &SALT));
    }

    #[test]
    fn test_salt_matters() {
        let response = scramble_password("test", &SALT);
        let other_salt = [0xFFu8; 20];
        assert!(!Authenticator::authenticate("test", &response, &other_salt));
    }
}
