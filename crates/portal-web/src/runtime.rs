//! The process-wide configuration store and its create-once guard.
//!
//! The store itself is an ordinary value (`portal_config::ConfigStore` has
//! no global state).  This module is the single composition point that makes
//! one instance available process-wide:
//!
//! - [`try_init_config`] creates the store with an explicit schema exactly
//!   once; a second call fails fast instead of silently returning the
//!   existing instance.  The bootstrap calls this.
//! - [`config`] is the lazy get-or-create accessor for ordinary call sites;
//!   it falls back to the default [`PortalSchema`] when nothing initialized
//!   the store yet.
//!
//! The `RwLock` exists only so the `OnceLock` global is `Sync`; the store is
//! written during startup and read-mostly afterwards, and no finer-grained
//! coordination is attempted.

use std::sync::{Arc, OnceLock, RwLock};

use portal_config::{ConfigSchema, ConfigStore};

use crate::error::BootstrapError;
use crate::schema::PortalSchema;

static APP_CONFIG: OnceLock<RwLock<ConfigStore>> = OnceLock::new();

/// Creates the process-wide store with `schema`, failing fast when a store
/// already exists.
///
/// # Errors
///
/// [`BootstrapError::ConfigAlreadyInitialized`] on a second call (or after
/// any earlier [`config`] call created the store lazily), or a
/// [`portal_config::ConfigError`] from default registration.
pub fn try_init_config(
    schema: Arc<dyn ConfigSchema>,
) -> Result<&'static RwLock<ConfigStore>, BootstrapError> {
    let store = ConfigStore::new(schema)?;
    APP_CONFIG
        .set(RwLock::new(store))
        .map_err(|_| BootstrapError::ConfigAlreadyInitialized)?;
    Ok(config())
}

/// The process-wide store, created on first use with the default
/// [`PortalSchema`] if [`try_init_config`] has not run.
pub fn config() -> &'static RwLock<ConfigStore> {
    APP_CONFIG.get_or_init(|| {
        // Safe to expect: the portal schema registers compile-time-known
        // keys, so default registration cannot fail.
        let store = ConfigStore::new(Arc::new(PortalSchema::new()))
            .expect("portal schema registers only well-formed keys");
        RwLock::new(store)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests share one process-wide OnceLock, so they are written to
    // hold regardless of execution order: both force lazy creation first
    // and only then assert on the guard.

    #[test]
    fn test_second_initialization_fails_fast() {
        // Arrange – make sure the store exists (lazily or from another test)
        let _ = config();

        // Act
        let result = try_init_config(Arc::new(PortalSchema::new()));

        // Assert
        assert!(matches!(
            result,
            Err(BootstrapError::ConfigAlreadyInitialized)
        ));
    }

    #[test]
    fn test_accessor_returns_the_same_instance_every_time() {
        let a: *const _ = config();
        let b: *const _ = config();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_lazily_created_store_carries_portal_defaults() {
        let store = config().read().expect("config lock poisoned");
        assert_eq!(store.get_int("common::port", -1), (7218, true));
    }
}
