//! Ergonomic Rust client for the xyzt.ai platform API
//!
//! This crate uploads CSV and gzip-compressed CSV files to xyzt.ai datasets,
//! deletes upload batches and lists datasets. Builders are powered by the
//! `bon` crate. [`BulkUploader`] uploads a whole directory tree.

pub mod batches;
pub mod bulk;
pub mod client;
pub mod datasets;
pub mod error;
pub mod security;
pub mod upload;

pub use batches::normalize_batch;
pub use bulk::{BatchMode, BulkReport, BulkUploader, FailedUpload};
pub use client::{XyztClient, DEFAULT_BASE_URL};
pub use datasets::Dataset;
pub use error::{Error, Result};
pub use security::SecretString;
pub use upload::{FileFormat, UploadKind};
