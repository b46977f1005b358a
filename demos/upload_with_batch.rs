//! Upload a records file into a batch, schedule its deletion and switch datasets
//!
//! Usage: `cargo run --example upload_with_batch -- mydata.csv.gz "Q1 2024"`

use xyzt_ergonomic::{Error, XyztClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let file = args.next().unwrap_or_else(|| "mydata.csv.gz".to_string());
    let batch = args.next();

    let mut client = XyztClient::from_env()?;

    print!("Uploading records from {} ... ", file);
    match client
        .upload_records()
        .file(&file)
        .maybe_batch(batch.clone())
        .call()
        .await
    {
        Ok(()) => println!("OK"),
        Err(Error::Upload {
            status, message, ..
        }) => println!("ERROR\n - status {}: {}", status, message),
        Err(e) => println!("ERROR\n - {}", e),
    }

    if let Some(batch) = batch {
        client.delete_batch().batch(batch).call().await?;
        println!(
            "Scheduled deletion of batch in dataset {}",
            client.dataset_id()
        );
    }

    // Later calls target another dataset
    if let Ok(other) = std::env::var("XYZT_OTHER_DATASET_ID") {
        client.set_dataset_id(other);
        println!("Now targeting dataset {}", client.dataset_id());
    }

    Ok(())
}
