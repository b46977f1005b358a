//! Uploading records and metadata files
//!
//! Both categories go to the same dataset but to different endpoints:
//! `/datasets/{id}/data/upload` for records and `/datasets/{id}/metadata/upload`
//! for metadata. The content type is taken from the file extension.

use bon::bon;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::batches::normalize_batch;
use crate::client::{ensure_success, XyztClient};
use crate::error::{Error, Result};

/// Which kind of data an upload carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadKind {
    #[default]
    Records,
    Metadata,
}

impl UploadKind {
    /// Path segment of the upload endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            UploadKind::Records => "data",
            UploadKind::Metadata => "metadata",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadKind::Records => write!(f, "records"),
            UploadKind::Metadata => write!(f, "metadata"),
        }
    }
}

/// Accepted upload file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Plain CSV
    Csv,
    /// Gzip-compressed CSV
    Gzip,
}

impl FileFormat {
    /// Resolve the format from the last extension of `path`
    ///
    /// `data.csv.gz` is [`FileFormat::Gzip`]. Anything other than `.csv` or
    /// `.gz` is rejected.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if extension.eq_ignore_ascii_case("csv") {
            Ok(FileFormat::Csv)
        } else if extension.eq_ignore_ascii_case("gz") {
            Ok(FileFormat::Gzip)
        } else {
            Err(Error::InvalidInput(format!(
                "unsupported file type for '{}': expected a .csv or .gz file",
                path.display()
            )))
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Gzip => "application/x-gzip",
        }
    }
}

#[bon]
impl XyztClient {
    /// Upload a records file to the current dataset
    ///
    /// Spaces in `batch` are replaced by underscores.
    ///
    /// ```no_run
    /// # async fn example(client: xyzt_ergonomic::XyztClient) -> xyzt_ergonomic::Result<()> {
    /// client
    ///     .upload_records()
    ///     .file("vessels.csv.gz")
    ///     .batch("Q1 2024")
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn upload_records(
        &self,
        #[builder(into)] file: PathBuf,
        #[builder(into)] batch: Option<String>,
    ) -> Result<()> {
        self.upload(UploadKind::Records, &file, batch.as_deref()).await
    }

    /// Upload a metadata file to the current dataset
    #[builder]
    pub async fn upload_metadata(
        &self,
        #[builder(into)] file: PathBuf,
        #[builder(into)] batch: Option<String>,
    ) -> Result<()> {
        self.upload(UploadKind::Metadata, &file, batch.as_deref()).await
    }
}

impl XyztClient {
    /// Upload `file` as `kind`, optionally tagged with a batch
    pub async fn upload(&self, kind: UploadKind, file: &Path, batch: Option<&str>) -> Result<()> {
        let format = FileFormat::from_path(file)?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidInput(format!("'{}' has no usable file name", file.display()))
            })?
            .to_string();

        // Read before authenticating so a missing file costs no token request
        let contents = tokio::fs::read(file).await?;

        let url = self.dataset_endpoint(&[kind.path_segment(), "upload"])?;
        let part = Part::bytes(contents)
            .file_name(file_name)
            .mime_str(format.mime_type())?;
        let form = Form::new().part("file", part);

        let mut request = self.authorized(Method::POST, url).await?;
        let batch = batch.map(normalize_batch).filter(|b| !b.is_empty());
        if let Some(batch) = &batch {
            request = request.query(&[("batch", batch.as_str())]);
        }

        let response = request.multipart(form).send().await?;
        ensure_success(response, |status, message| Error::Upload {
            kind,
            status,
            message,
        })
        .await?;

        info!(
            file = %file.display(),
            %kind,
            batch = batch.as_deref().unwrap_or(""),
            "Uploaded file"
        );
        Ok(())
    }
}
