//! Sync module - Mirror a local directory tree into a storage bucket.
//!
//! This module contains:
//! - Target collection (one upload target per regular file under the root)
//! - The sequential upload loop with delete-then-put semantics
//! - Per-file outcomes and the final run summary
//!
//! Uploads are strictly sequential: one file finishes (including its
//! preceding delete attempt) before the next begins. Individual failures
//! are recorded and the traversal continues.

use crate::config::SyncConfig;
use crate::storage::{BucketStatus, StorageClient};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One file to upload: where it lives locally and the key it gets remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    /// Absolute (or root-relative) path of the local file
    pub local_path: PathBuf,
    /// Object key within the bucket, always `/`-separated
    pub remote_key: String,
}

/// Terminal outcome of a single upload attempt. No automatic retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Succeeded,
    Failed(String),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Succeeded)
    }
}

/// One entry of the per-file result stream.
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub target: UploadTarget,
    pub outcome: UploadOutcome,
}

/// Aggregate success/failure counts for one full traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &UploadOutcome) {
        match outcome {
            UploadOutcome::Succeeded => self.succeeded += 1,
            UploadOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// True when no file failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Collect one upload target per regular file under `root`.
///
/// The remote key is the file's path relative to `root` with `/` as the
/// separator on every platform. A missing or non-directory root is a fatal
/// precondition error, raised before any network activity.
pub fn collect_targets(root: &Path) -> Result<Vec<UploadTarget>> {
    if !root.exists() {
        bail!(
            "Root directory does not exist: {}. Build the frontend first or pass --root.",
            root.display()
        );
    }
    if !root.is_dir() {
        bail!("Root path is not a directory: {}", root.display());
    }

    let mut targets = Vec::new();
    for entry in WalkDir::new(root) {
        let entry =
            entry.with_context(|| format!("Cannot walk directory: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("Cannot relativize path: {}", entry.path().display()))?;

        // Join components with '/' so keys are POSIX-style even on Windows
        let remote_key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        targets.push(UploadTarget {
            local_path: entry.path().to_path_buf(),
            remote_key,
        });
    }

    Ok(targets)
}

/// Directory synchronizer: walks the configured root and uploads each file
/// to the configured bucket, one at a time.
pub struct Synchronizer {
    client: StorageClient,
    config: SyncConfig,
}

impl Synchronizer {
    pub fn new(config: SyncConfig) -> Self {
        let client = StorageClient::new(
            config.base_url_trimmed(),
            &config.bucket,
            &config.access_token,
            &config.api_key,
        );
        Self { client, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn client(&self) -> &StorageClient {
        &self.client
    }

    /// Make sure the bucket exists before uploading.
    ///
    /// A 409 from the API means the bucket is already there and counts as
    /// success. Any other failure is logged as a warning and `None` is
    /// returned; the run proceeds either way (best-effort precondition, not
    /// a hard gate).
    pub fn ensure_bucket(&self) -> Option<BucketStatus> {
        match self.client.create_bucket(self.config.public) {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("Bucket creation attempt failed (continuing): {}", e);
                None
            }
        }
    }

    /// Upload a single file, overwriting any previous object at its key.
    ///
    /// Step 1 deletes the existing object, ignoring errors (it may not
    /// exist). Step 2 streams the file with a content-type guessed from
    /// the file name. Any error becomes a `Failed` outcome; this never
    /// aborts the surrounding traversal.
    pub fn upload_one(&self, target: &UploadTarget) -> UploadOutcome {
        // Overwrite is delete-then-put, so a concurrent reader can observe
        // a missing-object window between the two calls.
        if let Err(e) = self.client.delete_object(&target.remote_key) {
            debug!("Pre-upload delete of '{}' failed: {}", target.remote_key, e);
        }

        let content_type = mime_guess::from_path(&target.local_path).first_or_octet_stream();

        let file = match fs::File::open(&target.local_path) {
            Ok(file) => file,
            Err(e) => {
                return UploadOutcome::Failed(format!(
                    "Cannot read {}: {}",
                    target.local_path.display(),
                    e
                ));
            }
        };

        match self
            .client
            .put_object(&target.remote_key, file, content_type.as_ref())
        {
            Ok(()) => UploadOutcome::Succeeded,
            Err(e) => UploadOutcome::Failed(e.to_string()),
        }
    }

    /// Start a run: scan the root and return the lazy per-file result
    /// stream. Uploads happen as the stream is driven.
    pub fn run(&self) -> Result<SyncRun<'_>> {
        let targets = collect_targets(&self.config.root)?;
        Ok(SyncRun {
            sync: self,
            targets: targets.into_iter(),
        })
    }

    /// Convenience: drive a full run to completion and return the tally.
    pub fn sync_directory(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for report in self.run()? {
            summary.record(&report.outcome);
        }
        Ok(summary)
    }
}

/// Lazy per-file result stream for one run. Finite, single pass; each
/// `next()` performs one complete upload before returning.
pub struct SyncRun<'a> {
    sync: &'a Synchronizer,
    targets: std::vec::IntoIter<UploadTarget>,
}

impl SyncRun<'_> {
    /// Number of uploads remaining.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.len() == 0
    }
}

impl Iterator for SyncRun<'_> {
    type Item = UploadReport;

    fn next(&mut self) -> Option<Self::Item> {
        let target = self.targets.next()?;
        let outcome = self.sync.upload_one(&target);
        Some(UploadReport { target, outcome })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.targets.size_hint()
    }
}

impl ExactSizeIterator for SyncRun<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_one_target_per_regular_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        write_file(temp_dir.path(), "index.html", "<html></html>");
        write_file(temp_dir.path(), "assets/app.js", "console.log(1)");
        write_file(temp_dir.path(), "assets/css/style.css", "body {}");
        fs::create_dir_all(temp_dir.path().join("empty-dir"))?;

        let targets = collect_targets(temp_dir.path())?;
        assert_eq!(targets.len(), 3);

        let mut keys: Vec<&str> = targets.iter().map(|t| t.remote_key.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["assets/app.js", "assets/css/style.css", "index.html"]);

        Ok(())
    }

    #[test]
    fn test_keys_use_forward_slashes() -> Result<()> {
        let temp_dir = TempDir::new()?;
        write_file(temp_dir.path(), "a/b/c.txt", "x");

        let targets = collect_targets(temp_dir.path())?;
        assert_eq!(targets[0].remote_key, "a/b/c.txt");
        assert!(!targets[0].remote_key.contains('\\'));

        Ok(())
    }

    #[test]
    fn test_empty_root_yields_no_targets() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let targets = collect_targets(temp_dir.path())?;
        assert!(targets.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_root_is_precondition_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no-such-dir");

        let err = collect_targets(&missing).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_file_root_is_precondition_error() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "index.html", "<html></html>");

        let err = collect_targets(&temp_dir.path().join("index.html")).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_summary_accumulation() {
        let mut summary = RunSummary::default();
        summary.record(&UploadOutcome::Succeeded);
        summary.record(&UploadOutcome::Failed("HTTP 500: oops".to_string()));
        summary.record(&UploadOutcome::Succeeded);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_clean());
        assert!(RunSummary::default().is_clean());
    }
}
