//! The portal's concrete configuration schema.
//!
//! [`PortalSchema`] tells the generic `portal-config` store what the
//! `web.ini` file looks like: which defaults exist (with the comments that
//! `save` writes above them), which sections are mandatory, how each
//! recognised key is read, and in what order the file is emitted.
//!
//! The one piece of derived setup lives here too: resolving
//! `common::log-file` into a log directory (creating it if missing), or —
//! when the file does not name one — deriving the log file from the
//! `log_path` runtime value injected by the bootstrap.

use std::fs;
use std::path::{Path, PathBuf};

use portal_config::{
    ConfigError, ConfigSchema, ConfigStore, ManifestSection, SaveManifest, SectionTable, Value,
};

/// Log verbosity bounds for `common::log-level` (0 = everything,
/// 4 = errors only).
pub const LOG_LEVEL_MIN: i64 = 0;
pub const LOG_LEVEL_MAX: i64 = 4;

/// Default name of the log file when the configuration names none.
const DEFAULT_LOG_FILE_NAME: &str = "portal.log";

/// Schema for the portal's `web.ini`.
pub struct PortalSchema;

impl PortalSchema {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PortalSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSchema for PortalSchema {
    fn register_defaults(&self, store: &mut ConfigStore) -> Result<(), ConfigError> {
        store.register_default("common::ip", "0.0.0.0", Some("ip=0.0.0.0"))?;
        store.register_default(
            "common::port",
            7218,
            Some("port listened on by the web server, default to 7218.\nport=7218"),
        )?;
        store.register_default(
            "common::log-file",
            Value::Null,
            Some(
                "log file of the web server, default to <data>/log/portal.log\n\
                 log-file=/var/log/portal/web.log",
            ),
        )?;
        store.register_default(
            "common::log-level",
            2,
            Some(
                "`log-level` can be 0 ~ 4, default to 2.\n\
                 0  log everything.\n\
                 1  log everything except debug messages.\n\
                 2  log information/warning/error messages.\n\
                 3  log warning and error messages.\n\
                 4  log error messages only.\n\
                 log-level=2",
            ),
        )?;
        store.register_default(
            "common::debug-mode",
            0,
            Some(
                "0/1. default to 0.\n\
                 in debug mode, `log-level` is forced to 0.\n\
                 debug-mode=0",
            ),
        )?;

        store.register_default(
            "database::type",
            "sqlite",
            Some("database in use, should be sqlite/mysql, default to sqlite.\ntype=sqlite"),
        )?;
        store.register_default(
            "database::sqlite-file",
            Value::Null,
            Some("sqlite-file=/var/lib/portal/data/web.db"),
        )?;
        store.register_default("database::mysql-host", "127.0.0.1", Some("mysql-host=127.0.0.1"))?;
        store.register_default("database::mysql-port", 3306, Some("mysql-port=3306"))?;
        store.register_default("database::mysql-db", "portal", Some("mysql-db=portal"))?;
        store.register_default("database::mysql-prefix", "portal_", Some("mysql-prefix=portal_"))?;
        store.register_default("database::mysql-user", "portal", Some("mysql-user=portal"))?;
        store.register_default(
            "database::mysql-password",
            "password",
            Some("mysql-password=password"),
        )?;
        Ok(())
    }

    fn apply_file(
        &self,
        table: &SectionTable,
        store: &mut ConfigStore,
    ) -> Result<(), ConfigError> {
        for section in ["common", "database"] {
            if !table.has_section(section) {
                return Err(ConfigError::MissingSection(section.to_string()));
            }
        }

        // Each recognised key is read with a type-appropriate fallback: an
        // absent (or unconvertible) key leaves the compiled-in default
        // untouched.
        if let Some(v) = table.get_int("common", "log-level") {
            if (LOG_LEVEL_MIN..=LOG_LEVEL_MAX).contains(&v) {
                store.set_value("common::log-level", v)?;
            }
        }
        if let Some(v) = table.get_int("common", "debug-mode") {
            store.set_value("common::debug-mode", v)?;
        }
        if let Some(v) = table.get_str("common", "ip") {
            store.set_value("common::ip", v)?;
        }
        if let Some(v) = table.get_int("common", "port") {
            store.set_value("common::port", v)?;
        }
        if let Some(v) = table.get_str("common", "log-file") {
            store.set_value("common::log-file", v)?;
        }

        if let Some(v) = table.get_str("database", "type") {
            store.set_value("database::type", v)?;
        }
        if let Some(v) = table.get_str("database", "sqlite-file") {
            store.set_value("database::sqlite-file", v)?;
        }
        if let Some(v) = table.get_str("database", "mysql-host") {
            store.set_value("database::mysql-host", v)?;
        }
        if let Some(v) = table.get_int("database", "mysql-port") {
            store.set_value("database::mysql-port", v)?;
        }
        if let Some(v) = table.get_str("database", "mysql-db") {
            store.set_value("database::mysql-db", v)?;
        }
        if let Some(v) = table.get_str("database", "mysql-prefix") {
            store.set_value("database::mysql-prefix", v)?;
        }
        if let Some(v) = table.get_str("database", "mysql-user") {
            store.set_value("database::mysql-user", v)?;
        }
        if let Some(v) = table.get_str("database", "mysql-password") {
            store.set_value("database::mysql-password", v)?;
        }

        resolve_log_directory(store)
    }

    fn save_manifest(&self) -> SaveManifest {
        SaveManifest::new(vec![
            ManifestSection::new(
                "common",
                &["ip", "port", "log-file", "log-level", "debug-mode"],
            ),
            ManifestSection::new(
                "database",
                &[
                    "type",
                    "sqlite-file",
                    "mysql-host",
                    "mysql-port",
                    "mysql-db",
                    "mysql-prefix",
                    "mysql-user",
                    "mysql-password",
                ],
            ),
        ])
    }
}

/// Derived setup for the log location.
///
/// When the file names a `common::log-file`, its parent directory becomes
/// the `log_path` runtime value.  Otherwise the log file defaults to
/// `<log_path>/portal.log` (registered so it shows up on save), where
/// `log_path` was injected by the bootstrap.  Either way the directory is
/// created when missing; failure to create it fails the load.
fn resolve_log_directory(store: &mut ConfigStore) -> Result<(), ConfigError> {
    let (log_file, has_log_file) = store.get_str("common::log-file", "");

    let log_dir: PathBuf = if has_log_file && !log_file.is_empty() {
        let dir = match Path::new(&log_file).parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        store.set_runtime("log_path", dir.display().to_string())?;
        dir
    } else {
        let (log_path, has_log_path) = store.get_str("log_path", "");
        if !has_log_path || log_path.is_empty() {
            // Library-style use without a bootstrap-injected log path:
            // nothing to derive.
            return Ok(());
        }
        let dir = PathBuf::from(log_path);
        let file = dir.join(DEFAULT_LOG_FILE_NAME);
        store.register_default("common::log-file", file.display().to_string(), None)?;
        dir
    };

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).map_err(|source| ConfigError::Io {
            path: log_dir.clone(),
            source,
        })?;
    }
    Ok(())
}

/// The verbosity the operator asked for: `common::log-level`, forced to 0
/// (everything) when `common::debug-mode` is on.
pub fn effective_log_level(store: &ConfigStore) -> i64 {
    let (debug, _) = store.get_bool("common::debug-mode", false);
    if debug {
        return LOG_LEVEL_MIN;
    }
    store.get_int("common::log-level", 2).0
}

/// Maps a 0..=4 log level to a `tracing` filter directive.
pub fn tracing_directive(level: i64) -> &'static str {
    match level {
        0 => "trace",
        1 => "debug",
        2 => "info",
        3 => "warn",
        4 => "error",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn portal_store() -> ConfigStore {
        ConfigStore::new(Arc::new(PortalSchema::new())).unwrap()
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_defaults_cover_the_full_manifest() {
        let store = portal_store();
        assert_eq!(store.get_str("common::ip", ""), ("0.0.0.0".to_string(), true));
        assert_eq!(store.get_int("common::port", -1), (7218, true));
        assert_eq!(store.get_int("common::log-level", -1), (2, true));
        assert_eq!(store.get_str("database::type", ""), ("sqlite".to_string(), true));
        assert_eq!(store.get_int("database::mysql-port", -1), (3306, true));
    }

    #[test]
    fn test_null_defaults_read_as_not_found() {
        let store = portal_store();
        assert_eq!(store.get_str("common::log-file", "x"), ("x".to_string(), false));
        assert_eq!(
            store.get_str("database::sqlite-file", "x"),
            ("x".to_string(), false)
        );
    }

    #[test]
    fn test_debug_mode_defaults_off_and_reads_as_boolean() {
        let store = portal_store();
        // Stored as Int(0) → boolean read succeeds with false
        assert_eq!(store.get_bool("common::debug-mode", true), (false, true));
    }

    // ── apply_file ────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_file_requires_common_and_database_sections() {
        let mut store = portal_store();
        let table = SectionTable::parse_str("[common]\n").unwrap();

        let err = PortalSchema::new().apply_file(&table, &mut store).unwrap_err();

        assert!(matches!(err, ConfigError::MissingSection(s) if s == "database"));
    }

    #[test]
    fn test_apply_file_overlays_recognised_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = portal_store();
        store
            .set_runtime("log_path", dir.path().join("log").display().to_string())
            .unwrap();
        let table = SectionTable::parse_str(
            "[common]\nport=9000\nip=127.0.0.1\n\n[database]\ntype=mysql\nmysql-port=3307\n",
        )
        .unwrap();

        PortalSchema::new().apply_file(&table, &mut store).unwrap();

        assert_eq!(store.get_int("common::port", -1), (9000, true));
        assert_eq!(store.get_str("common::ip", ""), ("127.0.0.1".to_string(), true));
        assert_eq!(store.get_str("database::type", ""), ("mysql".to_string(), true));
        assert_eq!(store.get_int("database::mysql-port", -1), (3307, true));
    }

    #[test]
    fn test_out_of_range_log_level_keeps_the_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = portal_store();
        store
            .set_runtime("log_path", dir.path().join("log").display().to_string())
            .unwrap();
        let table =
            SectionTable::parse_str("[common]\nlog-level=9\n\n[database]\n").unwrap();

        PortalSchema::new().apply_file(&table, &mut store).unwrap();

        assert_eq!(store.get_int("common::log-level", -1), (2, true));
    }

    // ── Derived log directory ─────────────────────────────────────────────────

    #[test]
    fn test_configured_log_file_resolves_and_creates_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("logs").join("web.log");
        let mut store = portal_store();
        let table = SectionTable::parse_str(&format!(
            "[common]\nlog-file={}\n\n[database]\n",
            log_file.display()
        ))
        .unwrap();

        PortalSchema::new().apply_file(&table, &mut store).unwrap();

        let (log_path, found) = store.get_str("log_path", "");
        assert!(found);
        assert_eq!(PathBuf::from(&log_path), dir.path().join("logs"));
        assert!(dir.path().join("logs").exists(), "log directory must be created");
    }

    #[test]
    fn test_missing_log_file_derives_default_under_injected_log_path() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log");
        let mut store = portal_store();
        store
            .set_runtime("log_path", log_path.display().to_string())
            .unwrap();
        let table = SectionTable::parse_str("[common]\n\n[database]\n").unwrap();

        PortalSchema::new().apply_file(&table, &mut store).unwrap();

        let (log_file, found) = store.get_str("common::log-file", "");
        assert!(found);
        assert_eq!(
            PathBuf::from(log_file),
            log_path.join(DEFAULT_LOG_FILE_NAME)
        );
        assert!(log_path.exists(), "derived log directory must be created");
    }

    // ── Verbosity mapping ─────────────────────────────────────────────────────

    #[test]
    fn test_debug_mode_forces_the_lowest_level() {
        let mut store = portal_store();
        store.set_value("common::log-level", 4).unwrap();
        store.set_value("common::debug-mode", 1).unwrap();

        assert_eq!(effective_log_level(&store), LOG_LEVEL_MIN);
    }

    #[test]
    fn test_effective_level_follows_log_level_when_not_debugging() {
        let mut store = portal_store();
        store.set_value("common::log-level", 3).unwrap();

        assert_eq!(effective_log_level(&store), 3);
    }

    #[test]
    fn test_tracing_directive_mapping() {
        assert_eq!(tracing_directive(0), "trace");
        assert_eq!(tracing_directive(2), "info");
        assert_eq!(tracing_directive(4), "error");
        assert_eq!(tracing_directive(99), "info");
    }

    // ── Manifest ──────────────────────────────────────────────────────────────

    #[test]
    fn test_manifest_uses_human_authored_hyphenated_spellings() {
        let manifest = PortalSchema::new().save_manifest();
        let common = &manifest.groups[0];
        assert_eq!(common.section, "common");
        assert!(common.keys.iter().any(|k| k == "log-file"));
        let database = &manifest.groups[1];
        assert!(database.keys.iter().any(|k| k == "mysql-port"));
    }
}
