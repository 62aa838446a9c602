//! # portal-config
//!
//! Layered key/value configuration store for the Portal web server, backed
//! by an INI-style file with comment blocks and crash-atomic saves.
//!
//! The store is used by `portal-web` but has no dependency on it (or on any
//! I/O framework): it is a plain data structure plus a small file codec.
//!
//! # How the pieces fit together
//!
//! ```text
//! ConfigSchema (portal-web)        ConfigStore (this crate)
//!   register_defaults() ──────────▶ default layer  {value, comment}
//!   apply_file(table)   ──────────▶ loaded layer   {value}
//!   save_manifest()     ──┐              │
//!                         │              ▼
//!                         │        merged view  ◀── set_runtime()
//!                         │              │
//!                         │              ▼
//!                         │        get_str / get_int / get_bool
//!                         ▼
//!                   format::writer ──▶ web.ini (temp + rename)
//!                   format::parser ◀── web.ini
//! ```
//!
//! Keys are addressed as `"section::key"` (one separator at most, hyphens
//! normalised to underscores); a flat key falls into the reserved runtime
//! section `"_"`, which is never persisted and survives `reload`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use portal_config::{ConfigError, ConfigSchema, ConfigStore, ManifestSection,
//!                     SaveManifest, SectionTable};
//!
//! struct Schema;
//!
//! impl ConfigSchema for Schema {
//!     fn register_defaults(&self, store: &mut ConfigStore) -> Result<(), ConfigError> {
//!         store.register_default("common::port", 7218, Some("port=7218"))
//!     }
//!     fn apply_file(&self, table: &SectionTable, store: &mut ConfigStore)
//!         -> Result<(), ConfigError> {
//!         if let Some(port) = table.get_int("common", "port") {
//!             store.set_value("common::port", port)?;
//!         }
//!         Ok(())
//!     }
//!     fn save_manifest(&self) -> SaveManifest {
//!         SaveManifest::new(vec![ManifestSection::new("common", &["port"])])
//!     }
//! }
//!
//! let store = ConfigStore::new(Arc::new(Schema)).unwrap();
//! assert_eq!(store.get_int("common::port", -1), (7218, true));
//! assert_eq!(store.get_int("common::absent", -1), (-1, false));
//! ```

pub mod error;
pub mod format;
pub mod key;
pub mod schema;
pub mod store;
pub mod value;

pub use error::ConfigError;
pub use format::parser::SectionTable;
pub use key::{ConfigKey, KEY_SEPARATOR, RUNTIME_SECTION};
pub use schema::{ConfigSchema, ManifestSection, SaveManifest};
pub use store::ConfigStore;
pub use value::Value;
