//! # Metron Server
//!
//! Main binary: serves the REST API, runs migrations, and bootstraps user accounts.

use anyhow::Context;
use clap::{Parser, Subcommand};
use metron_api::{AppState, build_router};
use metron_common::{
    config::AppConfig,
    models::{NewUser, user_flags},
    validation::validate_request,
};
use metron_db::{Database, repository::users};
use std::net::SocketAddr;

#[derive(Debug, Parser)]
#[command(name = "metron", version, about = "Comic book metadata catalog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run migrations and serve the API (default).
    Serve,
    /// Apply pending migrations and exit.
    Migrate,
    /// Create a user account.
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "METRON_NEW_USER_PASSWORD")]
        password: String,
        /// Grant the editor flag.
        #[arg(long)]
        editor: bool,
        /// Grant the staff flag.
        #[arg(long)]
        staff: bool,
    },
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "metron=debug,tower_http=debug".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = metron_common::config::init().context("loading configuration")?;
    init_tracing(config);

    let db = Database::connect(config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, db).await,
        Command::Migrate => {
            db.migrate().await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Command::CreateUser {
            username,
            email,
            password,
            editor,
            staff,
        } => {
            let mut flags = user_flags::ACTIVE;
            if editor {
                flags |= user_flags::EDITOR;
            }
            if staff {
                flags |= user_flags::STAFF;
            }
            let new_user = NewUser {
                username,
                email,
                password,
                flags,
            };
            create_user(&db, new_user).await
        }
    }
}

async fn serve(config: &AppConfig, db: Database) -> anyhow::Result<()> {
    tracing::info!("Starting Metron v{}", env!("CARGO_PKG_VERSION"));

    db.migrate().await?;

    let router = build_router(AppState { db });
    let addr = SocketAddr::new(
        config.server.host.parse().context("parsing server.host")?,
        config.server.port,
    );

    tracing::info!("REST API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn create_user(db: &Database, new_user: NewUser) -> anyhow::Result<()> {
    validate_request(&new_user)?;
    db.migrate().await?;

    if users::find_by_username(&db.pool, &new_user.username).await?.is_some() {
        anyhow::bail!("user {} already exists", new_user.username);
    }

    let hash = metron_api::auth::hash_password(&new_user.password)
        .map_err(|e| anyhow::anyhow!("hashing password: {e}"))?;
    let user = users::create_user(
        &db.pool,
        &new_user.username,
        &new_user.email,
        &hash,
        new_user.flags,
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, flags = user.flags, "User created");
    Ok(())
}
