#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tbrush::run().await
}
