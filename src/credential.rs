//! Credential handling for the chat surface.
//!
//! The gate is construction: an [`ApiKey`] either exists and is non-empty or
//! the caller has nothing to send with. No local well-formedness check is
//! performed; a bad key is discovered by the first request.

use std::env;
use std::fmt;

/// Environment variable consulted when no key is supplied interactively.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// A non-empty API credential.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Build a key from user input, trimming surrounding whitespace.
    ///
    /// Returns `None` when the input is empty or whitespace-only, which is
    /// the "blocked" state: callers must not construct a client or issue any
    /// request without a key.
    pub fn from_input(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Read the key from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Option<Self> {
        let value = env::var(API_KEY_ENV).ok()?;
        Self::from_input(&value)
    }

    /// The raw secret, used to build the Authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_blocked() {
        assert!(ApiKey::from_input("").is_none());
    }

    #[test]
    fn whitespace_input_is_blocked() {
        assert!(ApiKey::from_input("   \t ").is_none());
    }

    #[test]
    fn non_empty_input_is_accepted() {
        let key = ApiKey::from_input("sk-test-123").unwrap();
        assert_eq!(key.expose(), "sk-test-123");
    }

    #[test]
    fn input_is_trimmed() {
        let key = ApiKey::from_input("  sk-test-123\n").unwrap();
        assert_eq!(key.expose(), "sk-test-123");
    }

    #[test]
    fn debug_redacts_the_secret() {
        let key = ApiKey::from_input("sk-test-123").unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("sk-test-123"));
        assert_eq!(debug, "ApiKey(<redacted>)");
    }
}
