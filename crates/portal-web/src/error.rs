//! Error type for the web process bring-up.

use std::path::PathBuf;

use portal_config::ConfigError;
use thiserror::Error;

/// Failures during web server bootstrap.
///
/// Everything here is fatal to the starting process; `main` wraps these in
/// `anyhow` context and exits.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A second `WebApp` was constructed in the same process.
    #[error("the web application already exists, you can not create more than one instance")]
    AlreadyRunning,

    /// `try_init_config` was called after the store had been created.
    #[error("the configuration store has already been initialized in this process")]
    ConfigAlreadyInitialized,

    /// The configuration file could not be loaded (details were logged by
    /// the store).
    #[error("failed to load configuration file: {0}")]
    ConfigLoad(PathBuf),

    /// The database collaborator refused to initialize.
    #[error("cannot initialize database interface")]
    DatabaseInit,

    /// The session manager collaborator refused to initialize.
    #[error("cannot initialize session manager")]
    SessionInit,

    /// The listen address could not be bound.
    #[error("cannot listen on {addr}: make sure it is not used by another application")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server failed while serving.
    #[error("web server failed: {0}")]
    Serve(#[source] std::io::Error),

    /// A configuration store operation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
