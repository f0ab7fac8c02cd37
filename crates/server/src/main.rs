//! locstat server binary
//!
//! Serves the archive scan and line-count endpoints over HTTP.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
