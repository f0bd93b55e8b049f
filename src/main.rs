use anyhow::{Context, Result};
use blog_forge::{BlogStore, ContentGenerator, OpenAiClient, Pipeline, PipelineError, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "blog-forge", version, about = "Generate profession blog posts from a CSV of businesses")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the batch and serve the read API (default)
    Run(BatchArgs),
    /// Run the batch only, then exit
    Import(BatchArgs),
}

#[derive(clap::Args, Default)]
struct BatchArgs {
    /// CSV file to process (overrides BLOGFORGE_INPUT_PATH)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Skip the generation service check before the batch
    #[arg(long)]
    no_preflight: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    blog_forge::logging::init_logging(&settings.log_level);
    info!("Blog Forge v{}", blog_forge::VERSION);

    let (serve, args) = match cli.command {
        Some(Commands::Run(args)) => (true, args),
        Some(Commands::Import(args)) => (false, args),
        None => (true, BatchArgs::default()),
    };
    if let Some(input) = args.input {
        settings.input_path = input;
    }
    if args.no_preflight {
        settings.preflight = false;
    }
    info!("Configuration: {:?}", settings);

    let store = BlogStore::open(&settings.database_path)?;
    info!("Database opened: {}", settings.database_path.display());

    if serve {
        run_with_server(settings, store).await
    } else {
        run_batch(&settings, store).await
    }
}

/// Build the pipeline from settings and run one batch
async fn run_batch(settings: &Settings, store: BlogStore) -> Result<()> {
    let client = Arc::new(
        OpenAiClient::new(
            settings.model.clone(),
            settings.require_api_key()?.to_string(),
            Some(settings.openai_base_url.clone()),
            settings.request_timeout(),
        )
        .context("Failed to build generation client")?,
    );

    let classifier = settings.classifier.build(client.clone());
    let generator = ContentGenerator::new(client.clone(), settings.max_tokens);
    let pipeline = Pipeline::new(client, classifier, generator, store);

    match pipeline.run(&settings.input_path, settings.preflight).await {
        Ok(summary) => {
            info!(
                total = summary.total,
                persisted = summary.persisted,
                failed = summary.failed,
                "Batch complete"
            );
            Ok(())
        }
        Err(PipelineError::Preflight(e)) => {
            error!("Generation service is not working: {}. Exiting...", e);
            std::process::exit(1);
        }
        Err(e) => {
            // The batch failing to start is logged; the server keeps running
            error!("Batch did not run: {}", e);
            Ok(())
        }
    }
}

#[cfg(feature = "server")]
async fn run_with_server(settings: Settings, store: BlogStore) -> Result<()> {
    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let server = tokio::spawn(blog_forge::api::serve(
        listener,
        store.clone(),
        blog_forge::api::shutdown_signal(),
    ));

    run_batch(&settings, store).await?;

    server
        .await
        .context("Server task panicked")?
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

#[cfg(not(feature = "server"))]
async fn run_with_server(settings: Settings, store: BlogStore) -> Result<()> {
    eprintln!("❌ Server mode not available, running the batch only");
    eprintln!("   Rebuild with: cargo build --features server");
    run_batch(&settings, store).await
}
