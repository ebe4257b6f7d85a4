//! Restaurant Import (menud-ri) - Main entry point
//!
//! HTTP microservice that accepts restaurant menu JSON uploads and imports
//! them asynchronously into the shared menud database.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use menud_ri::AppState;

/// Command-line arguments for menud-ri
#[derive(Parser, Debug)]
#[command(name = "menud-ri")]
#[command(about = "Restaurant Import microservice for menud")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5810", env = "MENUD_RI_PORT")]
    port: u16,

    /// Root folder containing the menud database
    #[arg(short, long, env = "MENUD_ROOT_FOLDER")]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menud_ri=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting menud-ri (Restaurant Import) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve root folder: CLI > env > TOML > OS default
    let root_folder =
        menud_common::config::resolve_root_folder(args.root_folder.as_deref(), "MENUD_ROOT_FOLDER");
    menud_common::config::ensure_root_folder(&root_folder)?;

    let db_path = menud_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = menud_ri::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let state = AppState::new(db_pool);
    let app = menud_ri::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("Listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
