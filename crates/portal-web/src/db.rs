//! Database collaborator seam.
//!
//! The portal's actual database driver lives outside this repository; the
//! bootstrap only needs three things from it: initialize, become connected,
//! and report schema status.  [`Database`] is that seam, [`LocalDatabase`]
//! is the trivial local-file implementation the shipped binary wires in, and
//! tests drive the readiness wait with a mock.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::warn;

/// Result of the schema status check after connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbStatus {
    /// Schema present and current — serve normally.
    Ready,
    /// No schema yet — the portal starts in maintenance mode.
    NeedCreate,
    /// Schema older than this build — maintenance mode.
    NeedUpgrade,
}

/// The external database interface the bootstrap depends on.
///
/// All methods report recoverable failure as `false`/status rather than
/// errors: whether a not-yet-connected database is fatal is the bootstrap's
/// call, not the driver's.
#[cfg_attr(test, mockall::automock)]
pub trait Database: Send + Sync {
    /// One-time driver initialization.  `false` aborts the bootstrap.
    fn init(&self) -> bool;

    /// Attempts to establish the connection.  The readiness wait keeps
    /// calling this until [`Database::is_connected`] turns true.
    fn connect(&self) -> bool;

    /// Whether the connection is currently established.
    fn is_connected(&self) -> bool;

    /// Schema status, meaningful once connected.
    fn status(&self) -> DbStatus;
}

/// Blocks (asynchronously) until the database reports connected, retrying
/// `connect` every `retry` interval and warning on each failed round.
pub async fn wait_until_ready(db: &dyn Database, retry: Duration) {
    db.connect();
    while !db.is_connected() {
        warn!(
            "database not connected, retrying in {} seconds",
            retry.as_secs_f64()
        );
        tokio::time::sleep(retry).await;
        db.connect();
    }
}

/// Trivial local-file database used by the shipped binary: "connecting" is
/// immediate, and the schema status is derived from whether the database
/// file exists yet.
pub struct LocalDatabase {
    file: PathBuf,
    connected: AtomicBool,
}

impl LocalDatabase {
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            connected: AtomicBool::new(false),
        }
    }
}

impl Database for LocalDatabase {
    fn init(&self) -> bool {
        true
    }

    fn connect(&self) -> bool {
        self.connected.store(true, Ordering::Relaxed);
        true
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn status(&self) -> DbStatus {
        if self.file.exists() {
            DbStatus::Ready
        } else {
            DbStatus::NeedCreate
        }
    }
}
