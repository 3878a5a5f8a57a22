//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of API keys.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when building a request header or query string.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose())
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

/// Connection details for the Supabase REST API.
#[derive(Clone)]
pub struct SupabaseCredentials {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Service-role key when available, anon key otherwise (secret)
    pub key: SecretString,
}

impl SupabaseCredentials {
    pub fn new(url: impl Into<String>, key: impl Into<SecretString>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    /// Prefer the service-role key, which bypasses row-level security.
    pub fn from_keys(
        url: impl Into<String>,
        anon_key: Option<String>,
        service_role_key: Option<String>,
    ) -> Option<Self> {
        let key = service_role_key
            .filter(|k| !k.trim().is_empty())
            .or(anon_key.filter(|k| !k.trim().is_empty()))?;
        Some(Self::new(url, key))
    }

    /// PostgREST endpoint for a table.
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }
}

impl fmt::Debug for SupabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseCredentials")
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
