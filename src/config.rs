//! Config module - Run configuration for a sync run.
//!
//! Everything the synchronizer needs is passed in explicitly through this
//! struct: endpoint, bucket, credentials, and the local root. There is no
//! config file and no ambient global state.

use anyhow::{bail, Result};
use std::path::PathBuf;

/// Configuration for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the Supabase project (e.g., "https://xyz.supabase.co")
    pub base_url: String,
    /// Target bucket name
    pub bucket: String,
    /// Bearer access token for the Storage API
    pub access_token: String,
    /// Project API key (sent as the `apikey` header)
    pub api_key: String,
    /// Whether the bucket should be created as public
    pub public: bool,
    /// Local directory to mirror
    pub root: PathBuf,
}

impl SyncConfig {
    /// Check all preconditions before any network activity.
    ///
    /// Failures here are fatal: the caller gets an error with remediation
    /// text and no upload is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            bail!("Base URL is required. Pass --base-url or set SUPABASE_URL.");
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            bail!(
                "Base URL must start with http:// or https:// (got '{}')",
                self.base_url
            );
        }
        if self.bucket.is_empty() {
            bail!("Bucket name is required. Pass --bucket.");
        }
        if self.access_token.is_empty() {
            bail!("Access token is required. Pass --token or set SUPABASE_ACCESS_TOKEN.");
        }
        if self.api_key.is_empty() {
            bail!("API key is required. Pass --api-key or set SUPABASE_ANON_KEY.");
        }
        if !self.root.exists() {
            bail!(
                "Root directory does not exist: {}. Build the frontend first or pass --root.",
                self.root.display()
            );
        }
        if !self.root.is_dir() {
            bail!("Root path is not a directory: {}", self.root.display());
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed, for joining API paths.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config(root: PathBuf) -> SyncConfig {
        SyncConfig {
            base_url: "https://example.supabase.co".to_string(),
            bucket: "frontend".to_string(),
            access_token: "sbp_test_token".to_string(),
            api_key: "anon_key".to_string(),
            public: true,
            root,
        }
    }

    #[test]
    fn test_valid_config_passes() -> Result<()> {
        let temp_dir = TempDir::new()?;
        valid_config(temp_dir.path().to_path_buf()).validate()
    }

    #[test]
    fn test_missing_token_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = valid_config(temp_dir.path().to_path_buf());
        config.access_token = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SUPABASE_ACCESS_TOKEN"));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = valid_config(temp_dir.path().to_path_buf());
        config.api_key = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SUPABASE_ANON_KEY"));
    }

    #[test]
    fn test_missing_root_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = valid_config(temp_dir.path().join("does-not-exist"));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("index.html");
        std::fs::write(&file_path, "<html></html>").unwrap();

        let config = valid_config(file_path);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = valid_config(temp_dir.path().to_path_buf());
        config.base_url = "example.supabase.co".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = valid_config(temp_dir.path().to_path_buf());
        config.base_url = "https://example.supabase.co/".to_string();

        assert_eq!(config.base_url_trimmed(), "https://example.supabase.co");
    }
}
