//! Songbook Server - HTTP REST API over a song-lyrics collection

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up MONGODB_* and SONGS_SERVER__* from a local .env if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
