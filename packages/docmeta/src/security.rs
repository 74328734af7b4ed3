//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of sensitive values.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// An API token that won't be logged or displayed.
///
/// Wraps `secrecy::SecretBox` so the bearer tokens for the extraction
/// provider and the metadata store never show up in logs, debug output,
/// or error messages. Token minting and refresh are the caller's
/// concern; the pipeline only carries the opaque value.
pub struct ApiToken(SecretBox<str>);

impl ApiToken {
    /// Create a new token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the token value for use.
    ///
    /// Only call this at the request-building site.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for ApiToken {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for ApiToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_not_in_debug() {
        let token = ApiToken::new("tok-super-secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("tok-super"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_works() {
        let token = ApiToken::new("tok-super-secret");
        assert_eq!(token.expose(), "tok-super-secret");
    }
}
