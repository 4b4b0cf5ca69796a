#[tokio::main]
async fn main() -> anyhow::Result<()> {
    civic_complaints::start_server().await
}
