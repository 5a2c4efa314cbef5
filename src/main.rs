use anyhow::Result;
use hestia::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
