//! The layered configuration store.
//!
//! # Layer model
//!
//! The store keeps three maps:
//!
//! - **Default layer** — `(section, key) → {value, comment}`, populated by
//!   the schema's `register_defaults` hook.  Comments registered here are
//!   what `save` writes above each key.
//! - **Loaded layer** — `(section, key) → value`, populated from a
//!   successfully parsed file or an explicit [`ConfigStore::set_value`]
//!   call.  Kept separate from the defaults so `save` can tell which keys
//!   the operator actually materialised in the file.
//! - **Merged view** — the flattened map every typed getter reads.  It is
//!   updated eagerly on every default registration and every loaded/set
//!   write, so reads never consult the two source layers.  Updating a key
//!   touches exactly one `(section, key)` slot; the most recently applied
//!   of {default, loaded, runtime} wins.
//!
//! The reserved `"_"` section of the merged view holds process-injected
//! runtime values ([`ConfigStore::set_runtime`]); those are never persisted
//! and survive [`ConfigStore::reload`].
//!
//! # Failure surface
//!
//! Mutators fail hard on malformed keys (programmer error).  Getters never
//! fail: a missing key, an explicit `Null`, a malformed key, or a value that
//! does not convert all come back as `(default, false)`.  `load`, `save`,
//! and `reload` log the underlying [`ConfigError`] and report success as a
//! `bool`, leaving the fatal-or-not decision to the caller.  This asymmetry
//! is part of the contract, not an accident.
//!
//! # Concurrency
//!
//! None.  Configuration is expected to be completed during process startup
//! and treated as read-mostly afterwards; callers that need to share the
//! store across threads wrap it in a lock at their composition point.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::error;

use crate::error::ConfigError;
use crate::format::parser::SectionTable;
use crate::format::writer;
use crate::key::{ConfigKey, RUNTIME_SECTION};
use crate::schema::{ConfigSchema, SaveManifest};
use crate::value::Value;

/// A registered default: the compiled-in value plus its optional,
/// possibly multi-line comment.
#[derive(Debug, Clone)]
struct DefaultEntry {
    value: Value,
    comment: Option<String>,
}

/// The hierarchical key/value configuration store.
pub struct ConfigStore {
    schema: Arc<dyn ConfigSchema>,
    defaults: HashMap<String, HashMap<String, DefaultEntry>>,
    loaded: HashMap<String, HashMap<String, Value>>,
    merged: HashMap<String, HashMap<String, Value>>,
    /// Recorded on the first successful `load`; `save` and `reload` target it.
    active_file: Option<PathBuf>,
}

impl ConfigStore {
    /// Creates a store and runs the schema's default registration once.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`ConfigSchema::register_defaults`]
    /// (malformed key — a programmer error in the schema).
    pub fn new(schema: Arc<dyn ConfigSchema>) -> Result<Self, ConfigError> {
        let mut store = Self {
            schema,
            defaults: HashMap::new(),
            loaded: HashMap::new(),
            merged: HashMap::from([(RUNTIME_SECTION.to_string(), HashMap::new())]),
            active_file: None,
        };
        let schema = Arc::clone(&store.schema);
        schema.register_defaults(&mut store)?;
        Ok(store)
    }

    // ── Mutators ──────────────────────────────────────────────────────────────

    /// Idempotent upsert into the default layer.
    ///
    /// The first registration stores value and comment.  Later calls always
    /// overwrite the value; the comment is overwritten only when a new one
    /// is supplied, otherwise the existing comment is preserved.  The value
    /// always propagates into the merged view.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidKey`] for a malformed key.
    pub fn register_default(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        comment: Option<&str>,
    ) -> Result<(), ConfigError> {
        let k = ConfigKey::parse(key)?;
        let value = value.into();

        let slot = self
            .defaults
            .entry(k.section.clone())
            .or_default()
            .entry(k.key.clone());
        match slot {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                e.get_mut().value = value.clone();
                if let Some(c) = comment {
                    e.get_mut().comment = Some(c.to_string());
                }
            }
            std::collections::hash_map::Entry::Vacant(v) => {
                v.insert(DefaultEntry {
                    value: value.clone(),
                    comment: comment.map(str::to_string),
                });
            }
        }

        self.update_merged(&k.section, &k.key, value);
        Ok(())
    }

    /// Upsert into the loaded layer (file-parsed or runtime override) and
    /// the merged view.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidKey`] for a malformed key.
    pub fn set_value(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let k = ConfigKey::parse(key)?;
        let value = value.into();
        self.loaded
            .entry(k.section.clone())
            .or_default()
            .insert(k.key.clone(), value.clone());
        self.update_merged(&k.section, &k.key, value);
        Ok(())
    }

    /// Writes the merged view only — for process-injected values such as
    /// resolved paths.  Never persisted by `save`; survives `reload` when
    /// placed in the reserved `"_"` section (which is where flat keys land).
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidKey`] for a malformed key.
    pub fn set_runtime(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let k = ConfigKey::parse(key)?;
        self.update_merged(&k.section, &k.key, value.into());
        Ok(())
    }

    // ── Typed getters ─────────────────────────────────────────────────────────

    /// String read from the merged view: stringify unconditionally.
    ///
    /// Returns `(default, false)` for a missing or `Null` slot, or a
    /// malformed key.
    pub fn get_str(&self, key: &str, default: &str) -> (String, bool) {
        match self.merged_value(key).and_then(Value::as_str_coerced) {
            Some(s) => (s, true),
            None => (default.to_string(), false),
        }
    }

    /// Base-10 integer read from the merged view.
    ///
    /// Returns `(default, false)` for a missing or `Null` slot, a malformed
    /// key, or a value that does not parse as an integer.
    pub fn get_int(&self, key: &str, default: i64) -> (i64, bool) {
        match self.merged_value(key).and_then(Value::as_int_coerced) {
            Some(i) => (i, true),
            None => (default, false),
        }
    }

    /// Boolean read from the merged view.
    ///
    /// `yes`/`true`/`1` and `no`/`false`/`0` (any letter case) are both
    /// *successful* reads; anything else returns the caller's default with
    /// `false`.
    pub fn get_bool(&self, key: &str, default: bool) -> (bool, bool) {
        match self.merged_value(key).and_then(|v| v.as_bool_coerced()) {
            Some(b) => (b, true),
            None => (default, false),
        }
    }

    /// The comment currently attached to a registered default, if any.
    pub fn default_comment(&self, key: &str) -> Option<String> {
        let k = ConfigKey::parse(key).ok()?;
        self.defaults
            .get(&k.section)?
            .get(&k.key)?
            .comment
            .clone()
    }

    // ── File lifecycle ────────────────────────────────────────────────────────

    /// Parses `path` and overlays its values via the schema hook.
    ///
    /// On any failure (missing file, unreadable file, parse error, schema
    /// rejection) the error is logged and `false` returned; the store keeps
    /// whatever state the hook applied before failing — at minimum the
    /// registered defaults.  Only on full success is `path` recorded as the
    /// active file.
    pub fn load(&mut self, path: &Path) -> bool {
        if !path.exists() {
            error!("{}", ConfigError::FileMissing(path.to_path_buf()));
            return false;
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(source) => {
                error!(
                    "{}",
                    ConfigError::Io {
                        path: path.to_path_buf(),
                        source,
                    }
                );
                return false;
            }
        };
        let table = match SectionTable::parse_str(&content) {
            Ok(t) => t,
            Err(e) => {
                error!("cannot load configuration file {}: {e}", path.display());
                return false;
            }
        };

        let schema = Arc::clone(&self.schema);
        if let Err(e) = schema.apply_file(&table, self) {
            error!("configuration file {} rejected: {e}", path.display());
            return false;
        }

        self.active_file = Some(path.to_path_buf());
        true
    }

    /// Serialises the default + loaded layers to `path` (or the active file
    /// when omitted) through the crash-atomic temp-write/remove/rename
    /// sequence.  Failures are logged and reported as `false`; the prior
    /// on-disk file stays intact.
    pub fn save(&self, path: Option<&Path>) -> bool {
        let Some(target) = path.or(self.active_file.as_deref()) else {
            error!("{}", ConfigError::NoActiveFile);
            return false;
        };

        let body = writer::render(self, &self.schema.save_manifest());
        match writer::write_atomic(target, &body) {
            Ok(()) => true,
            Err(e) => {
                error!("failed to save configuration to {}: {e}", target.display());
                false
            }
        }
    }

    /// Drops the default and loaded layers, keeps only the reserved runtime
    /// section of the merged view, re-registers the schema defaults, and
    /// re-loads the previously active file.
    pub fn reload(&mut self) -> bool {
        self.defaults.clear();
        self.loaded.clear();
        let runtime = self.merged.remove(RUNTIME_SECTION).unwrap_or_default();
        self.merged.clear();
        self.merged.insert(RUNTIME_SECTION.to_string(), runtime);

        let schema = Arc::clone(&self.schema);
        if let Err(e) = schema.register_defaults(self) {
            error!("default re-registration failed during reload: {e}");
            return false;
        }

        match self.active_file.clone() {
            Some(path) => self.load(&path),
            None => {
                error!("reload requested but no configuration file was ever loaded");
                false
            }
        }
    }

    /// The file recorded by the last successful `load`, if any.
    pub fn active_file(&self) -> Option<&Path> {
        self.active_file.as_deref()
    }

    /// The schema's current save manifest (display order of `save`).
    pub fn manifest(&self) -> SaveManifest {
        self.schema.save_manifest()
    }

    // ── Writer access (crate-internal) ────────────────────────────────────────

    /// A section is saveable when either source layer knows it.
    pub(crate) fn has_saveable_section(&self, section: &str) -> bool {
        self.defaults.contains_key(section) || self.loaded.contains_key(section)
    }

    pub(crate) fn default_comment_at(&self, section: &str, key: &str) -> Option<String> {
        self.defaults.get(section)?.get(key)?.comment.clone()
    }

    pub(crate) fn default_value_at(&self, section: &str, key: &str) -> Option<&Value> {
        self.defaults.get(section)?.get(key).map(|e| &e.value)
    }

    pub(crate) fn loaded_value_at(&self, section: &str, key: &str) -> Option<&Value> {
        self.loaded.get(section)?.get(key)
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn merged_value(&self, key: &str) -> Option<&Value> {
        let k = ConfigKey::parse(key).ok()?;
        self.merged.get(&k.section)?.get(&k.key)
    }

    fn update_merged(&mut self, section: &str, key: &str, value: Value) {
        self.merged
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }
}
