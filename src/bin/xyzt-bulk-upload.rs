//! Upload every matching file below a directory into an xyzt.ai dataset.
//!
//! The dataset must already exist, with its data (and optionally metadata)
//! properties defined. All settings can come from flags or `XYZT_*`
//! environment variables, including a `.env` file.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use xyzt_ergonomic::bulk::DEFAULT_SUFFIX;
use xyzt_ergonomic::{BatchMode, BulkUploader, UploadKind, XyztClient, DEFAULT_BASE_URL};

#[derive(Parser)]
#[command(
    name = "xyzt-bulk-upload",
    about = "Upload all matching files in a directory tree to an xyzt.ai dataset"
)]
struct Cli {
    /// Directory to walk
    #[arg(short, long, env = "XYZT_INPUT_DIR")]
    input: PathBuf,

    /// Id of the target dataset
    #[arg(short, long, env = "XYZT_DATASET_ID")]
    dataset: String,

    /// API user name
    #[arg(short, long, env = "XYZT_USERNAME")]
    user: String,

    /// API user password
    #[arg(short, long, env = "XYZT_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, env = "XYZT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// File name ending to upload; repeat for several
    #[arg(long = "suffix", default_value = DEFAULT_SUFFIX)]
    suffixes: Vec<String>,

    /// Use each first-level subdirectory as the batch of the files below it
    #[arg(long)]
    batch_by_directory: bool,

    /// Upload the files as metadata instead of records
    #[arg(long)]
    metadata: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let now = Instant::now();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let client = XyztClient::builder()
        .username(cli.user)
        .password(cli.password)
        .dataset_id(cli.dataset)
        .base_url(cli.base_url)
        .build();

    let uploader = BulkUploader::builder()
        .root(cli.input)
        .suffixes(cli.suffixes)
        .kind(if cli.metadata {
            UploadKind::Metadata
        } else {
            UploadKind::Records
        })
        .batch_mode(if cli.batch_by_directory {
            BatchMode::TopLevelDirectory
        } else {
            BatchMode::None
        })
        .build();

    let report = uploader.run(&client).await?;

    for failure in &report.failed {
        eprintln!("FAILED {}: {}", failure.path.display(), failure.error);
    }
    println!(
        "Uploaded {} file(s), {} failed, in {}ms",
        report.uploaded.len(),
        report.failed.len(),
        now.elapsed().as_millis()
    );

    if !report.is_success() {
        bail!("{} file(s) could not be uploaded", report.failed.len());
    }
    Ok(())
}
