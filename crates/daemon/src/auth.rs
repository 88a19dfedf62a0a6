// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential check and session tokens.
//!
//! The credential list is static, seeded from configuration. Tokens are
//! random, opaque, and live for the process lifetime.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Token length in characters. Nanoid's default alphabet at this length is
/// comfortably unguessable for a session token.
const TOKEN_LEN: usize = 21;

pub struct AuthRegistry {
    users: HashMap<String, String>,
    tokens: Mutex<HashMap<String, String>>,
}

impl AuthRegistry {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self { users: pairs.into_iter().collect(), tokens: Mutex::new(HashMap::new()) }
    }

    /// Check credentials; on success issue and record a fresh session token.
    pub fn verify(&self, username: &str, password: &str) -> Option<String> {
        if self.users.get(username).map(String::as_str) != Some(password) {
            return None;
        }
        let token = nanoid::nanoid!(TOKEN_LEN);
        self.tokens.lock().insert(token.clone(), username.to_string());
        Some(token)
    }

    /// Resolve a session token back to its username.
    pub fn user_of(&self, token: &str) -> Option<String> {
        self.tokens.lock().get(token).cloned()
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
