//! Namespaced key addressing.
//!
//! Every public store operation takes a key string like `"common::port"` and
//! splits it on the `::` separator into a `(section, key)` pair.  A flat key
//! with no separator implicitly belongs to the reserved runtime section
//! [`RUNTIME_SECTION`], and more than one separator is a usage error.
//!
//! Hyphens are normalised to underscores in both components so that the
//! human-authored file spelling (`mysql-port`) and the code spelling
//! (`mysql_port`) address the same slot.  Case is preserved.

use crate::error::ConfigError;

/// The reserved section that flat keys fall into.
///
/// Values in this section are process-injected (paths, runtime mode flags),
/// never persisted by `save`, and survive `reload`.
pub const RUNTIME_SECTION: &str = "_";

/// The separator token between section and key.
pub const KEY_SEPARATOR: &str = "::";

/// A parsed, normalised `(section, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigKey {
    pub section: String,
    pub key: String,
}

impl ConfigKey {
    /// Splits a raw key string into its normalised `(section, key)` pair.
    ///
    /// - `"port"` → `("_", "port")`
    /// - `"common::port"` → `("common", "port")`
    /// - `"a::b::c"` → [`ConfigError::InvalidKey`]
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKey`] when the string contains more
    /// than one separator.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = raw.split(KEY_SEPARATOR).collect();
        match parts.as_slice() {
            [key] => Ok(Self {
                section: RUNTIME_SECTION.to_string(),
                key: normalize(key),
            }),
            [section, key] => Ok(Self {
                section: normalize(section),
                key: normalize(key),
            }),
            _ => Err(ConfigError::InvalidKey(raw.to_string())),
        }
    }
}

/// Normalises an identifier: hyphens become underscores, case is preserved.
pub fn normalize(ident: &str) -> String {
    ident.replace('-', "_")
}
