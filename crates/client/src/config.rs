//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `POMELO_CLIENT_ID` - OAuth2 client ID registered with the auth server
//! - `POMELO_CLIENT_SECRET` - OAuth2 confidential client secret
//!
//! ## Optional
//! - `POMELO_AUTH_SERVER_URL` - Authorization server base URL (default: <http://localhost:9000>)
//! - `POMELO_API_BASE_URL` - API gateway base URL (default: <http://localhost:8082>)
//! - `POMELO_REDIRECT_URI` - OAuth2 callback URL (default: <http://localhost:3000/callback>)
//! - `POMELO_OAUTH_SCOPE` - Requested scopes (default: `READ WRITE`)
//! - `POMELO_CREDENTIALS_PATH` - Credential cache file (default: `$HOME/.config/pomelo/credentials.json`)

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 2.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Pomelo client configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct ClientConfig {
    /// OAuth2 authorization server base URL
    pub auth_server_url: String,
    /// API gateway base URL (user/product/order services)
    pub api_base_url: String,
    /// OAuth2 callback URL; must match the auth server's registration
    pub redirect_uri: String,
    /// OAuth2 scopes requested during authorization
    pub scope: String,
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 confidential client secret
    pub client_secret: SecretString,
    /// Path of the on-disk credential cache
    pub credentials_path: PathBuf,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("auth_server_url", &self.auth_server_url)
            .field("api_base_url", &self.api_base_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("credentials_path", &self.credentials_path)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or if the
    /// client secret fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            auth_server_url: get_env_or_default("POMELO_AUTH_SERVER_URL", "http://localhost:9000"),
            api_base_url: get_env_or_default("POMELO_API_BASE_URL", "http://localhost:8082"),
            redirect_uri: get_env_or_default(
                "POMELO_REDIRECT_URI",
                "http://localhost:3000/callback",
            ),
            scope: get_env_or_default("POMELO_OAUTH_SCOPE", "READ WRITE"),
            client_id: get_required_env("POMELO_CLIENT_ID")?,
            client_secret: get_validated_secret("POMELO_CLIENT_SECRET")?,
            credentials_path: credentials_path_from_env()?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Resolve the credential cache path, defaulting under `$HOME/.config/pomelo`.
fn credentials_path_from_env() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var("POMELO_CREDENTIALS_PATH") {
        return Ok(PathBuf::from(path));
    }
    let home = std::env::var("HOME")
        .map_err(|_| ConfigError::MissingEnvVar("HOME or POMELO_CREDENTIALS_PATH".to_string()))?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("pomelo")
        .join("credentials.json"))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-client-secret-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("q1w2e3r4t5y6u7i8", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = ClientConfig {
            auth_server_url: "http://localhost:9000".to_string(),
            api_base_url: "http://localhost:8082".to_string(),
            redirect_uri: "http://localhost:3000/callback".to_string(),
            scope: "READ WRITE".to_string(),
            client_id: "pomelo-web".to_string(),
            client_secret: SecretString::from("super_secret_value"),
            credentials_path: PathBuf::from("/tmp/credentials.json"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("pomelo-web"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_value"));
    }
}
