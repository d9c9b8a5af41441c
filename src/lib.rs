pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod sanitize;
pub mod services;
pub mod state;
pub mod validation;

use std::io::Write as _;
use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use config::Config;
use db::Store;

/// Rosterd - Employee Record Service
/// Role-gated employee records with manager-hierarchy integrity
#[derive(Parser)]
#[command(name = "rosterd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage API users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user (prompts for a password)
    Create {
        username: String,
        email: String,
        /// Role for the new user
        #[arg(long, default_value = "user", value_parser = ["user", "admin"])]
        role: String,
    },

    /// Reset a user's password (prompts for the new password)
    ResetPassword { username: String },
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Serve) => serve(config).await,

        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            Ok(())
        }

        Some(Commands::User { command }) => match command {
            UserCommands::Create {
                username,
                email,
                role,
            } => cmd_user_create(&config, &username, &email, &role).await,
            UserCommands::ResetPassword { username } => {
                cmd_user_reset_password(&config, &username).await
            }
        },
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Rosterd v{} starting...", env!("CARGO_PKG_VERSION"));

    let state = api::create_app_state_from_config(config.clone()).await?;
    let app = api::router(state).await;

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web API listening at http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let password = input.trim().to_string();

    if password.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }
    Ok(password)
}

async fn cmd_user_create(
    config: &Config,
    username: &str,
    email: &str,
    role: &str,
) -> anyhow::Result<()> {
    let password = prompt_password("Password")?;

    let store = Store::new(&config.general.database_path).await?;
    let user = store
        .create_user(username, email, &password, role, Some(&config.security))
        .await?;

    println!("✓ Created {} user: {}", user.role, user.username);
    println!("  API key: {}", user.api_key);
    Ok(())
}

async fn cmd_user_reset_password(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_none() {
        println!("User '{username}' not found.");
        return Ok(());
    }

    let password = prompt_password("New password")?;
    store
        .update_user_password(username, &password, Some(&config.security))
        .await?;

    println!("✓ Password updated for: {username}");
    Ok(())
}
