use anyhow::Context;
use foa_server::{Config, Server, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    setup_environment(&config).context("Failed to prepare work directory")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        work_dir = %config.work_dir.display(),
        "FOA server starting"
    );

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
