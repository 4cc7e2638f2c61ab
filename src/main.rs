use clap::Parser;
use rand::Rng;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use quill::auth::reset::ResetTokens;
use quill::config::{Cli, Config};
use quill::mail::Mailer;
use quill::state::AppState;
use quill::{app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Ensure uploads directory exists
    std::fs::create_dir_all(config.uploads_path())?;

    // Initialize database
    let pool = db::create_pool(config.db_path())?;
    db::run_migrations(&pool)?;

    // Reset tokens are signed with the configured secret. Without one we
    // sign with a per-process secret, so outstanding links die on restart.
    let secret = match &config.auth.secret {
        Some(secret) => secret.clone(),
        None => {
            tracing::warn!("No auth.secret configured; reset links will not survive a restart");
            let bytes: [u8; 32] = rand::thread_rng().gen();
            hex::encode(bytes)
        }
    };
    let reset_tokens = ResetTokens::new(&secret, config.auth.reset_ttl_secs);

    let mailer = Mailer::from_config(&config.mail)?;

    // Build app state and router
    let state = AppState {
        db: pool,
        config: config.clone(),
        reset_tokens,
        mailer,
    };
    let app = app(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
