//! Parser for the INI-style configuration dialect.
//!
//! The accepted text is deliberately small:
//!
//! ```text
//! ; a comment (also '#')
//! [section]
//! key=value
//! ```
//!
//! Blank lines are ignored.  The first `=` splits a key/value line; both
//! sides are trimmed.  A key/value line before any `[section]` header, or a
//! non-comment line without `=`, is a parse error carrying the 1-based line
//! number.  Later duplicates of the same key overwrite earlier ones.
//!
//! Identifiers are stored hyphen-normalised and lookups normalise the query,
//! so `mysql-port` in the file and `mysql_port` in code address the same
//! slot.  Values are kept verbatim (after trimming); type conversion happens
//! at read time via the typed getters, which schema hooks use to apply each
//! recognised key with a type-appropriate fallback.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::key::normalize;

/// A parsed `section → key → value` table.
#[derive(Debug, Default, Clone)]
pub struct SectionTable {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SectionTable {
    /// Parses configuration text into a table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] with the offending line number for a
    /// malformed section header, a line without `=`, or an entry before any
    /// section header.
    pub fn parse_str(input: &str) -> Result<Self, ConfigError> {
        let mut table = SectionTable::default();
        let mut current: Option<String> = None;

        for (idx, raw_line) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let Some(name) = rest.strip_suffix(']') else {
                    return Err(ConfigError::Parse {
                        line: line_no,
                        reason: format!("malformed section header '{line}'"),
                    });
                };
                let name = normalize(name.trim());
                table.sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse {
                    line: line_no,
                    reason: format!("expected 'key=value', got '{line}'"),
                });
            };
            let Some(section) = current.as_ref() else {
                return Err(ConfigError::Parse {
                    line: line_no,
                    reason: "entry before any [section] header".to_string(),
                });
            };

            table
                .sections
                .get_mut(section)
                .expect("current section was inserted when its header was seen")
                .insert(normalize(key.trim()), value.trim().to_string());
        }

        Ok(table)
    }

    /// Returns `true` if the (normalised) section exists in the file.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(&normalize(name))
    }

    /// Raw string read; `None` when the section or key is absent.
    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&normalize(section))?
            .get(&normalize(key))
            .map(String::as_str)
    }

    /// Base-10 integer read; absent or unparsable values yield `None` so the
    /// caller's compiled-in default stays untouched.
    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        let raw = self.get_str(section, key)?;
        match raw.parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(
                    "config value [{section}] {key}='{raw}' is not an integer; keeping default"
                );
                None
            }
        }
    }

    /// Boolean read using the same asymmetric spelling sets as the store's
    /// boolean accessor; unrecognised spellings yield `None`.
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.get_str(section, key)?.to_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        }
    }
}
