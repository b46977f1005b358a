//! Main client for interacting with the xyzt.ai platform API

use bon::bon;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, Url};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::security::SecretString;

/// SDK version for User-Agent header
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
const SDK_NAME: &str = env!("CARGO_PKG_NAME");

/// Public API root of the hosted platform
pub const DEFAULT_BASE_URL: &str = "https://api.platform-xyzt.ai/public/api";

/// Longest slice of an unexpected response body echoed back in errors
const MAX_BODY_ECHO: usize = 200;

#[derive(Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "userName")]
    user_name: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    jwt_token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Main client for interacting with the xyzt.ai platform API
///
/// Every operation fetches a fresh token first. Tokens are short-lived and an
/// upload can take a while, so nothing is cached between calls.
pub struct XyztClient {
    username: String,
    password: SecretString,
    dataset_id: String,
    base_url: String,
    http: ClientWithMiddleware,
}

impl std::fmt::Debug for XyztClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XyztClient")
            .field("username", &self.username)
            .field("password", &self.password)
            .field("dataset_id", &self.dataset_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[bon]
impl XyztClient {
    /// Create a new client for the given API user and dataset
    ///
    /// No connection is opened until the first operation. Timeouts are only
    /// applied when given; otherwise the HTTP client defaults hold.
    #[builder]
    pub fn new(
        #[builder(into)] username: String,
        #[builder(into)] password: SecretString,
        #[builder(into)] dataset_id: String,
        #[builder(into, default = String::from(DEFAULT_BASE_URL))] base_url: String,
        timeout: Option<Duration>,
        connect_timeout: Option<Duration>,
        #[builder(into)] user_agent: Option<String>,
        // overrides timeout, connect_timeout and user_agent when set
        http_client: Option<ClientWithMiddleware>,
    ) -> Self {
        let http = http_client.unwrap_or_else(|| {
            let user_agent =
                user_agent.unwrap_or_else(|| format!("{}/{} (Rust)", SDK_NAME, SDK_VERSION));

            let mut client_builder = reqwest::Client::builder().user_agent(user_agent);
            if let Some(timeout) = timeout {
                client_builder = client_builder.timeout(timeout);
            }
            if let Some(connect_timeout) = connect_timeout {
                client_builder = client_builder.connect_timeout(connect_timeout);
            }

            // Fall back to a default client rather than failing construction
            let client = client_builder.build().unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
            reqwest_middleware::ClientBuilder::new(client).build()
        });

        Self {
            username,
            password,
            dataset_id,
            base_url,
            http,
        }
    }
}

impl XyztClient {
    /// Create a new client from environment variables
    ///
    /// Reads from:
    /// - `XYZT_USERNAME`: Required API user name
    /// - `XYZT_PASSWORD`: Required API user password
    /// - `XYZT_DATASET_ID`: Required target dataset id
    /// - `XYZT_BASE_URL`: Optional base URL (defaults to <https://api.platform-xyzt.ai/public/api>)
    pub fn from_env() -> Result<Self> {
        use std::env;

        let required = |name: &str| {
            env::var(name).map_err(|_| {
                Error::Configuration(format!("{} environment variable not set", name))
            })
        };

        let username = required("XYZT_USERNAME")?;
        let password = required("XYZT_PASSWORD")?;
        let dataset_id = required("XYZT_DATASET_ID")?;
        let base_url = env::var("XYZT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::builder()
            .username(username)
            .password(password)
            .dataset_id(dataset_id)
            .base_url(base_url)
            .build())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Dataset targeted by uploads and batch deletion
    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// Point the client at another dataset; applies from the next call on
    pub fn set_dataset_id(&mut self, dataset_id: impl Into<String>) {
        self.dataset_id = dataset_id.into();
    }

    /// Build an absolute URL from path segments below the base URL
    ///
    /// Segments are percent-encoded, so a batch label can never escape its
    /// path position.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::Configuration(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::Configuration(format!("base URL '{}' cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Endpoint below `/datasets/{datasetId}`
    pub(crate) fn dataset_endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec!["datasets", self.dataset_id.as_str()];
        all.extend_from_slice(segments);
        self.endpoint(&all)
    }

    /// Request a fresh bearer token and turn it into an `Authorization` value
    ///
    /// Every non-2xx answer is an [`Error::Authentication`], whether or not
    /// the body carries a `message` field.
    pub(crate) async fn authenticate(&self) -> Result<HeaderValue> {
        let url = self.endpoint(&["tokens"])?;
        debug!(user = %self.username, "Requesting token");

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&TokenRequest {
                user_name: &self.username,
                password: self.password.expose_secret(),
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        let success = response.status().is_success();
        let body = response.text().await?;
        if !success {
            let message = server_message(&body).unwrap_or_else(|| {
                format!("token request rejected without a message: {}", echo_body(&body))
            });
            return Err(Error::Authentication { status, message });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
                status,
                message: format!("token response without a usable jwtToken ({})", e),
            })?;
        let token = SecretString::new(token.jwt_token);
        let mut auth =
            HeaderValue::from_str(&token.bearer()).map_err(|_| Error::MalformedResponse {
                status,
                message: "token contains characters not allowed in a header".to_string(),
            })?;
        auth.set_sensitive(true);

        debug!("Requesting token success");
        Ok(auth)
    }

    /// Start a request that carries a freshly acquired bearer token
    pub(crate) async fn authorized(
        &self,
        method: reqwest::Method,
        url: Url,
    ) -> Result<RequestBuilder> {
        let auth = self.authenticate().await?;

        debug!(%method, %url, "Sending authorized request");
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json"))
    }
}

/// Pass successful responses through, turn the rest into domain errors
///
/// Error responses must be JSON with a `message` field. Anything else becomes
/// [`Error::MalformedResponse`].
pub(crate) async fn ensure_success<F>(response: Response, on_error: F) -> Result<Response>
where
    F: FnOnce(u16, String) -> Error,
{
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let status = status.as_u16();
    let body = response.text().await?;
    match server_message(&body) {
        Some(message) => Err(on_error(status, message)),
        None => Err(Error::MalformedResponse {
            status,
            message: format!(
                "error response without a message field: {}",
                echo_body(&body)
            ),
        }),
    }
}

/// The `message` field of a JSON error body
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|error| error.message)
}

fn echo_body(body: &str) -> String {
    if body.trim().is_empty() {
        return "<empty body>".to_string();
    }
    match body.char_indices().nth(MAX_BODY_ECHO) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
