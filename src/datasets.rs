//! Dataset listing
//!
//! Datasets are owned by the server. The client hands back each record as an
//! opaque JSON object (typically `id`, `name`, `description` and `batches`).

use reqwest::Method;
use serde_json::{Map, Value};
use tracing::info;

use crate::client::{ensure_success, XyztClient};
use crate::error::{Error, Result};

/// One dataset record as returned by the server
pub type Dataset = Map<String, Value>;

impl XyztClient {
    /// List the datasets visible to the API user
    pub async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let url = self.endpoint(&["datasets"])?;

        let response = self.authorized(Method::GET, url).await?.send().await?;
        let response = ensure_success(response, |status, message| Error::Retrieval {
            status,
            message,
        })
        .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let datasets = parse_datasets(status, &body)?;

        info!(count = datasets.len(), "Retrieved datasets");
        Ok(datasets)
    }
}

fn parse_datasets(status: u16, body: &str) -> Result<Vec<Dataset>> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        status,
        message: format!("expected a JSON array of dataset objects ({})", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_passes_records_through() {
        let fixture = json!([
            {"id": "ds1", "name": "Vessels", "description": "AIS", "batches": ["Q1_2024"]},
            {"id": "ds2", "name": "Trucks", "extra": {"nested": true}}
        ]);
        let parsed = parse_datasets(200, &fixture.to_string()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), fixture);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_datasets(200, r#"{"id": "ds1"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { status: 200, .. }));
    }

    #[test]
    fn test_parse_rejects_non_object_items() {
        assert!(parse_datasets(200, r#"["ds1", "ds2"]"#).is_err());
    }
}
