use startrail::StartrailProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // stdout carries the go-plugin handshake line; all logging goes to
    // stderr.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    tfbridge::serve_default(StartrailProvider::new()).await?;

    Ok(())
}
