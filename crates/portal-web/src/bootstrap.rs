//! Web process bring-up.
//!
//! [`WebApp`] is deliberately thin glue: every step delegates to a
//! collaborator (the configuration store, the database seam, the session
//! manager, axum).  The sequence mirrors what an operator sees at startup:
//!
//! ```text
//! WebApp::new()                 -- single-instance guard
//!   .init(app_root, data_dir)   -- inject runtime paths, load etc/web.ini
//!   .run(db, sessions)          -- db readiness wait, app mode, sessions,
//!                                  bind common::ip:common::port, serve
//! ```
//!
//! Failure before the listener is bound aborts the process with a
//! [`BootstrapError`]; after that, only Ctrl+C stops the server.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::db::{self, Database, DbStatus};
use crate::error::BootstrapError;
use crate::runtime;
use crate::session::SessionManager;

/// Value of the `app_mode` runtime key when the database schema is current.
pub const APP_MODE_NORMAL: &str = "normal";
/// Value of the `app_mode` runtime key while the schema needs create/upgrade.
pub const APP_MODE_MAINTENANCE: &str = "maintenance";

/// Name of the configuration file under `<data_dir>/etc/`.
const CONFIG_FILE_NAME: &str = "web.ini";

/// How long to wait between database connection attempts.
const DB_RETRY_INTERVAL: Duration = Duration::from_secs(5);

static WEB_APP_EXISTS: AtomicBool = AtomicBool::new(false);

/// The web application process, constructible once per process.
pub struct WebApp {
    cfg_file: PathBuf,
}

impl WebApp {
    /// Creates the application, failing fast when one already exists in
    /// this process.
    ///
    /// # Errors
    ///
    /// [`BootstrapError::AlreadyRunning`] on a second construction.
    pub fn new() -> Result<Self, BootstrapError> {
        if WEB_APP_EXISTS.swap(true, Ordering::SeqCst) {
            return Err(BootstrapError::AlreadyRunning);
        }
        Ok(Self {
            cfg_file: PathBuf::new(),
        })
    }

    /// Injects the process paths into the store's reserved runtime section
    /// and loads `<data_dir>/etc/web.ini`.
    ///
    /// # Errors
    ///
    /// [`BootstrapError::ConfigLoad`] when the file is missing, unparsable,
    /// or rejected by the schema (details are logged by the store); the
    /// caller decides whether that is fatal.
    pub fn init(&mut self, app_root: &Path, data_dir: &Path) -> Result<(), BootstrapError> {
        let cfg_path = data_dir.join("etc");
        self.cfg_file = cfg_path.join(CONFIG_FILE_NAME);

        let store = runtime::config();
        let mut store = store.write().expect("config lock poisoned");

        store.set_runtime("app_path", path_text(app_root))?;
        store.set_runtime("static_path", path_text(&app_root.join("static")))?;
        store.set_runtime("template_path", path_text(&app_root.join("view")))?;
        store.set_runtime("res_path", path_text(&app_root.join("res")))?;
        store.set_runtime("data_path", path_text(data_dir))?;
        store.set_runtime("cfg_path", path_text(&cfg_path))?;
        store.set_runtime("log_path", path_text(&data_dir.join("log")))?;

        if !store.load(&self.cfg_file) {
            return Err(BootstrapError::ConfigLoad(self.cfg_file.clone()));
        }
        Ok(())
    }

    /// Brings the process up and serves until shutdown.
    ///
    /// # Errors
    ///
    /// Any [`BootstrapError`] from a collaborator refusing to initialize,
    /// the listen address being unavailable, or the server failing while
    /// serving.
    pub async fn run(
        &self,
        database: Arc<dyn Database>,
        sessions: Arc<dyn SessionManager>,
    ) -> Result<(), BootstrapError> {
        info!("load config file: {}", self.cfg_file.display());
        info!("Portal web server starting ...");

        if !database.init() {
            error!("cannot initialize database interface");
            return Err(BootstrapError::DatabaseInit);
        }
        db::wait_until_ready(database.as_ref(), DB_RETRY_INTERVAL).await;

        let mode = app_mode_for(database.status());
        if mode == APP_MODE_MAINTENANCE {
            info!("database schema needs create/upgrade; entering maintenance mode");
        }

        let (ip, port, static_path) = {
            let store = runtime::config();
            let mut store = store.write().expect("config lock poisoned");
            store.set_runtime("app_mode", mode)?;
            (
                store.get_str("common::ip", "0.0.0.0").0,
                store.get_int("common::port", 7218).0,
                store.get_str("static_path", "static").0,
            )
        };

        if !sessions.init() {
            error!("cannot initialize session manager");
            return Err(BootstrapError::SessionInit);
        }

        let app = build_router(Path::new(&static_path));

        let addr = format!("{ip}:{port}");
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| BootstrapError::Bind {
                addr: addr.clone(),
                source,
            })?;
        if ip == "0.0.0.0" {
            info!("works on [http://127.0.0.1:{port}]");
        } else {
            info!("works on [http://{addr}]");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(BootstrapError::Serve)?;

        info!("Portal web server stopped");
        Ok(())
    }
}

/// Maps the database schema status to the `app_mode` runtime value.
pub fn app_mode_for(status: DbStatus) -> &'static str {
    match status {
        DbStatus::Ready => APP_MODE_NORMAL,
        DbStatus::NeedCreate | DbStatus::NeedUpgrade => APP_MODE_MAINTENANCE,
    }
}

/// Builds the HTTP router: the health probe plus the static file service.
///
/// The controller/routing layer proper is an external collaborator; it
/// merges its own routes on top of this base at the composition point.
pub fn build_router(static_path: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_path))
}

async fn health() -> &'static str {
    "ok"
}

/// Completes when a shutdown signal is received (Ctrl+C on all platforms).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("shutdown signal received, stopping server ...");
}

fn path_text(path: &Path) -> String {
    path.display().to_string()
}
