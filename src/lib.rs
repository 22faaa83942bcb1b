//! distsync - Mirror a local build directory into a Supabase Storage bucket.
//!
//! Provides the following capabilities:
//! - Walk a build-output directory and derive one remote object key per file
//! - Ensure the target bucket exists (tolerating "already exists")
//! - Upload each file with delete-then-put semantics, one at a time
//! - Report per-file outcomes and a final success/failure tally
//!
//! Pipeline: Scan (collect targets) -> Ensure bucket -> Upload (sequential) -> Summary

pub mod config;
pub mod storage;
pub mod sync;

// Re-export main types
pub use config::SyncConfig;
pub use storage::{StorageClient, StorageError};
pub use sync::{RunSummary, SyncRun, Synchronizer, UploadOutcome, UploadReport, UploadTarget};
