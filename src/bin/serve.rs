use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use logo_functions::LogoFunctions;
use logo_gemini::GeminiClient;
use logo_image_utils::LocalImageHost;
use logo_openai::DalleClient;
use logo_server::config::Config;
use logo_server::{create_app, AppState};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Serves the logo generation functions over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 4001)]
    port: u16,

    /// Keep the provider's image URLs instead of copying logos to this server
    #[arg(long)]
    no_rehost: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("logo_server=debug,logo_functions=debug,tower_http=info")
        }))
        .with_target(false)
        .finish()
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let pool = logo_db::get_db_pool(&config.database_url).await?;
    let images = Arc::new(DalleClient::from_env()?);
    let prompts = Arc::new(GeminiClient::from_env()?);

    let mut functions = LogoFunctions::new(pool, images, prompts);
    if config.rehost_images && !args.no_rehost {
        tracing::info!("Re-hosting logos under {}", config.images_dir.display());
        functions = functions.with_image_host(Arc::new(LocalImageHost::new(
            config.images_dir.clone(),
            config.public_url.clone(),
        )));
    }

    let app = create_app(AppState::new(functions), &config.images_dir);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
