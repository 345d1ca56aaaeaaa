//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of provider API
//! keys and the content-store application password.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Read a secret from the environment.
    ///
    /// Returns `None` when the variable is unset or empty, which matches
    /// the optional provider credentials in the config: an absent key
    /// means the provider rejects calls with `NotConfigured`, it does not
    /// mean an empty bearer token goes over the wire.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an
    /// Authorization header).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_not_in_debug() {
        let secret = SecretString::new("sk-super-secret-key");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("sk-super"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_works() {
        let secret = SecretString::new("sk-super-secret-key");
        assert_eq!(secret.expose(), "sk-super-secret-key");
    }

    #[test]
    fn test_from_env_treats_empty_as_absent() {
        std::env::set_var("ENRICH_TEST_KEY", "sk-123");
        std::env::set_var("ENRICH_TEST_KEY_EMPTY", "");

        let key = SecretString::from_env("ENRICH_TEST_KEY").expect("set");
        assert_eq!(key.expose(), "sk-123");
        assert!(SecretString::from_env("ENRICH_TEST_KEY_EMPTY").is_none());
        assert!(SecretString::from_env("ENRICH_TEST_KEY_UNSET").is_none());

        std::env::remove_var("ENRICH_TEST_KEY");
        std::env::remove_var("ENRICH_TEST_KEY_EMPTY");
    }
}
