//! HTTP middleware with retry support using reqwest-middleware.
//!
//! The client itself never retries. Callers who want retries for read-only
//! calls can hand in their own middleware stack.
//!
//! Multipart upload bodies cannot be cloned, so retry middleware refuses to
//! send them. Keep a plain client around for uploads.
//!
//! Run with: `cargo run --example http_middleware_retry`

use reqwest_middleware::ClientBuilder as MiddlewareClientBuilder;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use std::time::Duration;
use xyzt_ergonomic::{Result, XyztClient};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let username = std::env::var("XYZT_USERNAME").unwrap_or_default();
    let password = std::env::var("XYZT_PASSWORD").unwrap_or_default();
    let dataset_id = std::env::var("XYZT_DATASET_ID").unwrap_or_default();

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(100), Duration::from_secs(10))
        .build_with_max_retries(3);

    let http_client = MiddlewareClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

    let client = XyztClient::builder()
        .username(username)
        .password(password)
        .dataset_id(dataset_id)
        .http_client(http_client)
        .build();

    // Both the token request and the listing are retried on transient errors
    match client.list_datasets().await {
        Ok(datasets) => println!("Found {} dataset(s)", datasets.len()),
        Err(e) => eprintln!("Error after retries: {e}"),
    }

    Ok(())
}
