//! Example listing datasets and their batches

use xyzt_ergonomic::XyztClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    let client = XyztClient::from_env()?;

    let datasets = client.list_datasets().await?;
    for dataset in &datasets {
        let field = |name: &str| {
            dataset
                .get(name)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        println!("ID\t\t: {}", field("id"));
        println!("Name\t\t: {}", field("name"));
        println!("Description\t: {}", field("description"));
        println!("Batches[]\t: {}\n", field("batches"));
    }

    Ok(())
}
