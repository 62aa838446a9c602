//! portal-web library crate.
//!
//! The web server half of Portal: a thin bootstrap that wires the
//! `portal-config` store into an HTTP process.  The heavy lifting —
//! controllers, the real database driver, the real session layer — lives
//! outside this repository behind the seams in [`db`] and [`session`].
//!
//! # Module map
//!
//! ```text
//! runtime    process-wide config store (create-once guard + lazy accessor)
//! schema     PortalSchema: web.ini defaults, validation, save manifest
//! bootstrap  WebApp: paths → config load → db wait → sessions → serve
//! db         Database seam + LocalDatabase + readiness wait
//! session    SessionManager seam + in-memory implementation
//! error      BootstrapError
//! ```
//!
//! `main.rs` composes the pieces: it initializes logging, creates the
//! guarded store with [`schema::PortalSchema`], and hands concrete
//! collaborators to [`bootstrap::WebApp::run`].

pub mod bootstrap;
pub mod db;
pub mod error;
pub mod runtime;
pub mod schema;
pub mod session;

pub use bootstrap::WebApp;
pub use error::BootstrapError;
