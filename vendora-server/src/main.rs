use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vendora_core::auth::AuthCrypto;
use vendora_server::create_app;
use vendora_server::infra::config::{ConfigLoad, ConfigLoader};
use vendora_server::infra::startup::{
    build_identity_store, build_state, connect_database,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "vendora-server")]
#[command(about = "Login and session-token service for the Vendora directory")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a vendora.toml (overrides VENDORA_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a dotenv file (defaults to ./.env)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// JSON file of seed accounts served from memory instead of Postgres
    #[arg(long)]
    dev_accounts: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prompt for a password and print its peppered Argon2id hash
    HashPassword,
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Some(Command::HashPassword) => hash_password(&cli.serve),
        Some(Command::Db(DbCommand::Migrate)) => {
            run_db_migrate(&cli.serve).await
        }
        None => run_server(cli.serve).await,
    }
}

fn config_loader(args: &ServeArgs) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }
    loader
}

fn load_config(args: &ServeArgs) -> anyhow::Result<ConfigLoad> {
    let mut load = config_loader(args)
        .load()
        .context("failed to load configuration")?;

    if let Some(port) = args.port {
        load.config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        load.config.server.host = host;
    }
    if let Some(path) = args.dev_accounts.clone() {
        load.config.dev_accounts = Some(path);
    }

    if load.config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &load.config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }
    for warning in &load.warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(
                    message = %warning.message,
                    hint = %hint,
                    "configuration warning"
                )
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(load)
}

fn hash_password(args: &ServeArgs) -> anyhow::Result<()> {
    let pepper = config_loader(args)
        .load_pepper()
        .context("failed to resolve AUTH_PASSWORD_PEPPER")?;
    let crypto = AuthCrypto::new(&pepper)
        .context("failed to initialise password hashing")?;

    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("failed to read password")?;

    let hash = crypto
        .hash_password(&password)
        .context("failed to hash password")?;
    println!("{hash}");
    Ok(())
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let ConfigLoad { config, .. } = load_config(args)?;
    let database = config
        .database
        .as_ref()
        .context("DATABASE_URL is required for migrations")?;

    let pool = connect_database(&database.url).await?;
    vendora_core::MIGRATOR
        .run(&pool)
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let ConfigLoad { config, .. } = load_config(&args)?;

    let identities = build_identity_store(&config).await?;
    let state = build_state(&config, identities)?;

    info!(
        auth.token_ttl = %humantime::format_duration(config.auth.token_ttl),
        "session issuance ready"
    );

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
