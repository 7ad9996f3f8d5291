//! Secure token manager with masking capabilities
//!
//! The push key and the GitHub token end up on `dotnet` command lines. This module keeps
//! track of them so that anything echoed to the CI log can be masked first, using the
//! `secrecy` crate to keep the raw values out of `Debug` output.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

/// Secure token manager for registry credentials
///
/// # Examples
///
/// ```
/// use publish_nuget::security::SecureTokenManager;
/// use secrecy::SecretString;
///
/// let mut manager = SecureTokenManager::new();
/// manager.register(&SecretString::new("oy2abcdefghijklmnop".into()));
/// assert_eq!(manager.mask_tokens_in_string("-k oy2abcdefghijklmnop"), "-k oy2...nop");
/// ```
#[derive(Default, Clone)]
pub struct SecureTokenManager {
    tokens: Vec<SecretString>,
}

impl SecureTokenManager {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Registers a secret to be masked in log output
    ///
    /// Empty secrets are ignored.
    pub fn register(&mut self, token: &SecretString) {
        if token.expose_secret().is_empty() {
            return;
        }
        self.tokens.push(token.clone());
    }

    /// Number of registered secrets
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification purposes.
    /// Tokens shorter than 10 characters are fully masked as "****".
    ///
    /// # Examples
    ///
    /// ```
    /// use publish_nuget::security::SecureTokenManager;
    ///
    /// let manager = SecureTokenManager::new();
    /// assert_eq!(manager.mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(manager.mask_token("short"), "****");
    /// ```
    pub fn mask_token(&self, token: &str) -> String {
        if token.len() < 10 || !token.is_ascii() {
            return "****".to_string();
        }

        let prefix = &token[..3];
        let suffix = &token[token.len() - 3..];
        format!("{}...{}", prefix, suffix)
    }

    /// Masks all registered tokens in a string
    pub fn mask_tokens_in_string(&self, text: &str) -> String {
        let mut masked = text.to_string();

        for token in &self.tokens {
            let token_str = token.expose_secret();
            if let Ok(regex) = Regex::new(&regex::escape(token_str)) {
                let masked_token = self.mask_token(token_str);
                masked = regex
                    .replace_all(&masked, masked_token.as_str())
                    .to_string();
            }
        }

        masked
    }
}

impl std::fmt::Debug for SecureTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureTokenManager")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}
