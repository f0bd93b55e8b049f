// Blog Forge - Read API Server
// Serves already-generated blog records without running a batch

use anyhow::{Context, Result};
use blog_forge::{api, BlogStore, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    blog_forge::logging::init_logging(&settings.log_level);

    if !settings.database_path.exists() {
        eprintln!("❌ Database not found at {:?}", settings.database_path);
        eprintln!("   Run: cargo run -- import");
        eprintln!("   to generate blog posts first.");
        std::process::exit(1);
    }

    let store = BlogStore::open(&settings.database_path)?;
    info!("Database opened: {}", settings.database_path.display());

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    api::serve(listener, store, api::shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}
