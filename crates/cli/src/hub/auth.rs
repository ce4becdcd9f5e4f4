// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Credential access for hub connections and REST submissions.
//!
//! The client never acquires or refreshes credentials itself. It asks an
//! [`AuthProvider`] whether the user is currently authenticated before every
//! connect and reconnect attempt, and for the bearer token to present.

use std::sync::{PoisonError, RwLock};

/// Source of the "currently authenticated" signal and the bearer credential.
pub trait AuthProvider: Send + Sync {
    /// Whether a usable credential is currently available.
    fn is_authenticated(&self) -> bool;

    /// The bearer token to present, if any.
    fn credential(&self) -> Option<String>;
}

/// A replaceable bearer token held in memory.
///
/// The hosting application calls [`TokenStore::set`] after sign-in and
/// [`TokenStore::clear`] on sign-out or when an `unauthorized` signal fires.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new(token: Option<String>) -> Self {
        TokenStore {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = (!token.trim().is_empty()).then_some(token);
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl AuthProvider for TokenStore {
    fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn credential(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
