//! On-disk credential cache.
//!
//! Stands in for the browser's durable key-value storage: the access token
//! and the last-known user profile are written to a JSON file (0600 on unix),
//! read back at startup, and cleared on logout or auth failure.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::UserProfile;
use crate::auth::AccessToken;
use crate::error::{ClientError, Result};

/// Persisted session credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialCache {
    /// The access token, if a login has completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessToken>,
    /// The last profile fetched for that token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl CredentialCache {
    /// Load the cache from `path`.
    ///
    /// Returns an empty cache if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `CredentialStore` if the file exists but cannot be read, or
    /// `Parse` if its contents are not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| store_error(path, source))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save the cache to `path` with restricted permissions (0600).
    ///
    /// # Errors
    ///
    /// Returns `CredentialStore` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| store_error(parent, source))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .map_err(|source| store_error(path, source))?;
            file.write_all(contents.as_bytes())
                .map_err(|source| store_error(path, source))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, contents).map_err(|source| store_error(path, source))?;
        }

        Ok(())
    }

    /// Delete the cache file. Removing a file that never existed is not an
    /// error, which keeps logout idempotent.
    ///
    /// # Errors
    ///
    /// Returns `CredentialStore` if the file exists but cannot be removed.
    pub fn clear(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(store_error(path, source)),
        }
    }
}

fn store_error(path: &Path, source: std::io::Error) -> ClientError {
    ClientError::CredentialStore {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_cache_path() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "pomelo-store-test-{}-{n}/credentials.json",
            std::process::id()
        ))
    }

    fn sample_token() -> AccessToken {
        AccessToken {
            access_token: "tok-123".to_string(),
            token_type: "Bearer".to_string(),
            obtained_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let cache = CredentialCache::load(&temp_cache_path()).unwrap();
        assert!(cache.access_token.is_none());
        assert!(cache.user.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_cache_path();
        let cache = CredentialCache {
            access_token: Some(sample_token()),
            user: None,
        };
        cache.save(&path).unwrap();

        let loaded = CredentialCache::load(&path).unwrap();
        assert_eq!(loaded.access_token.unwrap().access_token, "tok-123");

        CredentialCache::clear(&path).unwrap();
    }

    #[test]
    fn test_clear_is_idempotent() {
        let path = temp_cache_path();
        let cache = CredentialCache {
            access_token: Some(sample_token()),
            user: None,
        };
        cache.save(&path).unwrap();

        CredentialCache::clear(&path).unwrap();
        assert!(!path.exists());
        // Second clear must not fail
        CredentialCache::clear(&path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_cache_path();
        CredentialCache::default().save(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        CredentialCache::clear(&path).unwrap();
    }
}
