use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invest_core::cli::{handle_balances, handle_config_validate, Cli, Commands};
use invest_core::config::{Config, LogFormat};
use invest_core::seed::SeedFile;
use invest_core::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Setup logging
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Config) => handle_config_validate(&config),
        Some(Commands::Balances { file, user, at }) => handle_balances(&config, &file, user, at),
        Some(Commands::Serve) | None => serve(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let seed = match &config.seed_file {
        Some(path) => SeedFile::from_path(path)?,
        None => SeedFile::default(),
    };
    let repos = seed.into_repositories().await?;

    let state = AppState::new(
        Arc::new(repos.transactions),
        Arc::new(repos.plans),
        Arc::new(repos.users),
        config.currency_symbol.clone(),
    );

    let mut app = create_app(state);
    if let Some(cors) = config.cors_layer()? {
        tracing::info!(origins = ?config.cors_allowed_origins, "CORS enabled");
        app = app.layer(cors);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
