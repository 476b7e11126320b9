use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use noteful_core::{seed_store, NoteStore, SeedData, SqliteStore};
use noteful_server::rest::create_router;
use noteful_server::settings::load_settings;
use noteful_server::state::AppState;

#[derive(Parser)]
#[command(name = "noteful-server", about = "Noteful notes, folders and tags API", version)]
struct Cli {
    /// Wipe the database and load this JSON seed document before serving
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Database file, or `:memory:` (overrides settings and DATABASE_PATH)
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    noteful_server::init_logging();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(database) = cli.database {
        settings.database_path = database;
    }
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }

    let store = if settings.is_in_memory() {
        SqliteStore::open_in_memory()?
    } else {
        let path = PathBuf::from(&settings.database_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        SqliteStore::open(&path).with_context(|| format!("opening {}", path.display()))?
    };
    tracing::info!("using database {}", settings.database_path);

    if let Some(seed) = cli.seed {
        let data = SeedData::from_file(&seed)
            .with_context(|| format!("reading seed file {}", seed.display()))?;
        store.clear_all().await?;
        let report = seed_store(&store, &data).await?;
        tracing::info!(
            "database reset from {} ({} notes)",
            seed.display(),
            report.notes
        );
    }

    let state = Arc::new(AppState::new(Arc::new(store)));
    let app = create_router(state);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
