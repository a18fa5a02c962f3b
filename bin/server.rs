// NEO Catalog - Web Server
// Loads the catalog once, then serves it read-only over REST

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use neo_catalog::{api, Catalog, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🌐 NEO Catalog - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let settings = Settings::from_env();

    let catalog = Catalog::from_files(&settings.neo_file, &settings.cad_file)
        .context("Failed to build the NEO catalog")?;
    println!(
        "✓ Catalog loaded: {} NEOs, {} close approaches",
        catalog.neo_count(),
        catalog.approach_count()
    );

    let app = api::router(Arc::new(catalog));

    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server_addr))?;

    info!(addr = %settings.server_addr, "Server listening");
    println!("\n🚀 Server running at http://{}", settings.server_addr);
    println!("   API:  http://{}/api/health", settings.server_addr);
    println!("\nPress Ctrl+C to stop");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
