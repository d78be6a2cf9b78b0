use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    hydrodash::run().await
}
