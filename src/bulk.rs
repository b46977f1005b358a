//! Bulk upload of every matching file below a directory
//!
//! Files are uploaded one at a time in directory traversal order, with a fresh
//! token per file. A failing file is logged and skipped; the run goes on.
//!
//! ## Batch modes
//!
//! | Mode | Files in root | Files below `root/<dir>/...` |
//! |------|---------------|-------------------------------|
//! | [`BatchMode::None`] | no batch | no batch |
//! | [`BatchMode::TopLevelDirectory`] | no batch | batch `<dir>` |
//!
//! ## Example
//!
//! ```no_run
//! use xyzt_ergonomic::{BatchMode, BulkUploader, XyztClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = XyztClient::from_env()?;
//! let report = BulkUploader::builder()
//!     .root("/data/vessels")
//!     .batch_mode(BatchMode::TopLevelDirectory)
//!     .build()
//!     .run(&client)
//!     .await?;
//! println!("{} uploaded, {} failed", report.uploaded.len(), report.failed.len());
//! # Ok(())
//! # }
//! ```

use bon::Builder;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::client::XyztClient;
use crate::error::{Error, Result};
use crate::upload::UploadKind;

/// Suffix selected when none is configured
pub const DEFAULT_SUFFIX: &str = ".csv.gz";

/// How uploaded files are assigned to batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Upload everything without a batch
    #[default]
    None,
    /// Use the first-level subdirectory a file lives under as its batch
    TopLevelDirectory,
}

/// A file that could not be uploaded
#[derive(Debug)]
pub struct FailedUpload {
    pub path: PathBuf,
    pub error: Error,
}

/// Outcome of a bulk run
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Files uploaded successfully, in upload order
    pub uploaded: Vec<PathBuf>,
    pub failed: Vec<FailedUpload>,
}

impl BulkReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Walks a directory tree and uploads each matching file
#[derive(Debug, Clone, Builder)]
pub struct BulkUploader {
    #[builder(into)]
    root: PathBuf,
    /// File name endings to select, e.g. `.csv.gz`
    #[builder(default = vec![DEFAULT_SUFFIX.to_string()])]
    suffixes: Vec<String>,
    #[builder(default)]
    kind: UploadKind,
    #[builder(default)]
    batch_mode: BatchMode,
}

impl BulkUploader {
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.suffixes.iter().any(|s| name.ends_with(s.as_str())))
    }

    /// Batch for `path` under the configured mode
    fn batch_for(&self, path: &Path) -> Option<String> {
        match self.batch_mode {
            BatchMode::None => None,
            BatchMode::TopLevelDirectory => {
                let relative = path.strip_prefix(&self.root).ok()?;
                let mut components = relative.components();
                let first = components.next()?;
                // a file directly in the root has nothing after its own name
                components.next()?;
                first.as_os_str().to_str().map(str::to_string)
            }
        }
    }

    /// Every matching file below the root, in traversal order
    pub fn matching_files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a directory",
                self.root.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            match entry {
                Ok(entry) if is_regular_file(&entry) && self.matches(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
        Ok(files)
    }

    /// Upload every matching file through `client`
    ///
    /// Only a missing root fails the whole run. Per-file failures end up in
    /// [`BulkReport::failed`].
    pub async fn run(&self, client: &XyztClient) -> Result<BulkReport> {
        let files = self.matching_files()?;
        info!(
            root = %self.root.display(),
            count = files.len(),
            "Starting bulk upload"
        );

        let mut report = BulkReport::default();
        for path in files {
            let batch = self.batch_for(&path);
            match batch.as_deref() {
                Some(batch) => info!("Uploading file {} to batch {}", path.display(), batch),
                None => info!("Uploading file {} without batch", path.display()),
            }

            match client.upload(self.kind, &path, batch.as_deref()).await {
                Ok(()) => report.uploaded.push(path),
                Err(error) => {
                    match &error {
                        Error::Authentication { status, .. } => warn!(
                            "Could not request token for {} (status {}), skipping: {}",
                            path.display(),
                            status,
                            error
                        ),
                        _ => warn!("Could not upload {}: {}", path.display(), error),
                    }
                    report.failed.push(FailedUpload { path, error });
                }
            }
        }

        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "Bulk upload finished"
        );
        Ok(report)
    }
}

/// Regular files and symlinks to regular files
///
/// Symlinked directories are listed but never descended into.
fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}
