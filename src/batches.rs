//! Batch labels and batch deletion

use bon::bon;
use reqwest::Method;
use tracing::info;

use crate::client::{ensure_success, XyztClient};
use crate::error::{Error, Result};

/// Normalize a batch label for use in a URL
///
/// Spaces become underscores. Applying it twice gives the same result.
pub fn normalize_batch(batch: &str) -> String {
    batch.replace(' ', "_")
}

#[bon]
impl XyztClient {
    /// Schedule deletion of a batch from the current dataset
    ///
    /// Deletion happens asynchronously on the server; this only schedules it.
    /// A missing or empty batch fails without contacting the server.
    #[builder]
    pub async fn delete_batch(&self, #[builder(into)] batch: Option<String>) -> Result<()> {
        let batch = match batch {
            Some(batch) if !batch.is_empty() => batch,
            _ => return Err(Error::InvalidInput("batch cannot be empty".to_string())),
        };

        let normalized = normalize_batch(&batch);
        let url = self.dataset_endpoint(&["batches", &normalized])?;

        let response = self.authorized(Method::DELETE, url).await?.send().await?;
        ensure_success(response, |status, message| Error::Deletion {
            batch: batch.clone(),
            status,
            message,
        })
        .await?;

        info!(batch = %normalized, dataset = %self.dataset_id(), "Scheduled batch deletion");
        Ok(())
    }
}
