//! Portal web server — entry point.
//!
//! Startup sequence:
//!
//! 1. Initialize structured logging (`RUST_LOG` overrides the `info`
//!    default).
//! 2. Parse CLI arguments (`--app-root`, `--data-dir`; both also readable
//!    from `PORTAL_APP_ROOT` / `PORTAL_DATA_DIR`).
//! 3. Create the guarded process-wide configuration store with the portal
//!    schema.
//! 4. `WebApp::init` — inject runtime paths, load `<data>/etc/web.ini`.
//! 5. `WebApp::run` — database readiness wait, session manager, bind the
//!    configured address, serve until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use portal_web::bootstrap::WebApp;
use portal_web::db::LocalDatabase;
use portal_web::runtime;
use portal_web::schema::{self, PortalSchema};
use portal_web::session::MemorySessionStore;

/// Portal web server.
#[derive(Debug, Parser)]
#[command(name = "portal-web", about = "Portal web server", version)]
struct Cli {
    /// Application root containing the static/, view/, and res/ directories.
    #[arg(long, default_value = ".", env = "PORTAL_APP_ROOT")]
    app_root: PathBuf,

    /// Writable data directory containing etc/web.ini and the log directory.
    #[arg(long, default_value = "./data", env = "PORTAL_DATA_DIR")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Portal web server starting");

    runtime::try_init_config(Arc::new(PortalSchema::new()))
        .context("configuration store initialization failed")?;

    let mut app = WebApp::new().context("web application guard")?;
    app.init(&cli.app_root, &cli.data_dir)
        .context("web application initialization failed")?;

    // Report what the operator configured; tracing itself stays on the
    // RUST_LOG-driven filter installed above.
    let (directive, db_file) = {
        let store = runtime::config().read().expect("config lock poisoned");
        let directive = schema::tracing_directive(schema::effective_log_level(&store));
        let (file, has_file) = store.get_str("database::sqlite-file", "");
        let db_file = if has_file && !file.is_empty() {
            PathBuf::from(file)
        } else {
            cli.data_dir.join("web.db")
        };
        (directive, db_file)
    };
    info!("configured log level: {directive}");

    let database = Arc::new(LocalDatabase::new(db_file));
    let sessions = Arc::new(MemorySessionStore::new());

    app.run(database, sessions)
        .await
        .context("web server terminated abnormally")?;
    Ok(())
}
