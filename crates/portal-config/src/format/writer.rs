//! Writer for the INI-style configuration dialect, plus the crash-atomic
//! file replacement it feeds.
//!
//! [`render`] is a pure function from store layers + save manifest to the
//! exact file body, so the formatting rules are tested here against literal
//! expected output rather than through the filesystem.
//!
//! # Formatting rules
//!
//! - The first line is always `; codec: utf-8`.
//! - Sections appear in manifest order.  A `[section]` header (normalised
//!   spelling) is emitted only when the section exists in the default or
//!   loaded layer, preceded by one blank line.
//! - For each manifest key, in manifest order: if the default layer carries
//!   a comment for the (normalised) key, one blank line then each comment
//!   line prefixed `; `.  The value is the loaded value if present, else the
//!   registered default; `Null` (or a key in neither layer) emits no value
//!   line.  The value line uses the manifest's literal spelling — a
//!   hyphenated manifest key stays hyphenated in the file even though every
//!   internal lookup uses the underscored form.  When no comment was
//!   emitted, the value line gets the blank separator line instead.
//! - The file ends with a trailing newline.
//!
//! # Crash atomicity
//!
//! [`write_atomic`] writes the body to `<target>.tmp`, removes any
//! pre-existing target, and renames the temp file onto the target.  A crash
//! at any point leaves either the old complete file or the new complete
//! file, never a half-written one.  The temp path is fixed, so concurrent
//! saves of the same file are deliberately uncoordinated (the store is a
//! startup-time, read-mostly structure).

use std::fs;
use std::path::{Path, PathBuf};

use crate::key::normalize;
use crate::schema::SaveManifest;
use crate::store::ConfigStore;
use crate::error::ConfigError;
use crate::value::Value;

/// Renders the store's default + loaded layers to the on-disk text, in
/// manifest order.
pub fn render(store: &ConfigStore, manifest: &SaveManifest) -> String {
    let mut lines: Vec<String> = vec!["; codec: utf-8".to_string()];

    for group in &manifest.groups {
        let section = normalize(&group.section);
        if !store.has_saveable_section(&section) {
            continue;
        }

        lines.push(String::new());
        lines.push(format!("[{section}]"));

        for key in &group.keys {
            let slot = normalize(key);

            let mut have_comment = false;
            if let Some(comment) = store.default_comment_at(&section, &slot) {
                lines.push(String::new());
                for comment_line in comment.split('\n') {
                    lines.push(format!("; {comment_line}"));
                }
                have_comment = true;
            }

            // Loaded value wins; a never-loaded key falls back to its
            // registered default.  Null in either place means no value line.
            let value = store
                .loaded_value_at(&section, &slot)
                .or_else(|| store.default_value_at(&section, &slot));
            if let Some(text) = value.and_then(Value::render) {
                if !have_comment {
                    lines.push(String::new());
                }
                lines.push(format!("{key}={text}"));
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Replaces `path` with `content` via the temp-write/remove/rename sequence.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for any filesystem failure; the prior target
/// file is left intact unless the temp write already succeeded and only the
/// final rename remains.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let tmp = tmp_path(path);

    fs::write(&tmp, content).map_err(|source| ConfigError::Io {
        path: tmp.clone(),
        source,
    })?;

    if path.exists() {
        fs::remove_file(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::rename(&tmp, path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `<target>.tmp`, appended to the full file name (`web.ini` → `web.ini.tmp`).
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::{ConfigSchema, ManifestSection, SaveManifest};
    use crate::format::parser::SectionTable;
    use crate::value::Value;

    /// Minimal schema: a handful of defaults with and without comments.
    struct FixtureSchema;

    impl ConfigSchema for FixtureSchema {
        fn register_defaults(&self, store: &mut ConfigStore) -> Result<(), ConfigError> {
            store.register_default("common::ip", "0.0.0.0", Some("ip=0.0.0.0"))?;
            store.register_default(
                "common::port",
                7218,
                Some("listen port, default 7218.\nport=7218"),
            )?;
            store.register_default("common::log-file", Value::Null, Some("log-file="))?;
            store.register_default("net::rate-limit", 10, None)?;
            Ok(())
        }

        fn apply_file(
            &self,
            _table: &SectionTable,
            _store: &mut ConfigStore,
        ) -> Result<(), ConfigError> {
            Ok(())
        }

        fn save_manifest(&self) -> SaveManifest {
            SaveManifest::new(vec![
                ManifestSection::new("common", &["ip", "port", "log-file"]),
                ManifestSection::new("net", &["rate-limit"]),
                ManifestSection::new("ghost", &["nothing"]),
            ])
        }
    }

    fn fixture_store() -> ConfigStore {
        ConfigStore::new(Arc::new(FixtureSchema)).unwrap()
    }

    #[test]
    fn test_render_matches_literal_expected_output() {
        // Arrange – one loaded override on top of the registered defaults
        let mut store = fixture_store();
        store.set_value("common::port", 9000).unwrap();

        // Act
        let body = render(&store, &store.manifest());

        // Assert – the exact file body, byte for byte.  Note: log-file has a
        // comment but no value line (Null default, never loaded), and the
        // [ghost] manifest section is skipped because no layer knows it.
        let expected = "\
; codec: utf-8

[common]

; ip=0.0.0.0
ip=0.0.0.0

; listen port, default 7218.
; port=7218
port=9000

; log-file=

[net]

rate-limit=10
";
        assert_eq!(body, expected);
    }

    #[test]
    fn test_default_only_key_is_emitted_with_its_default_value() {
        // No set_value at all – port must still appear with 7218
        let store = fixture_store();
        let body = render(&store, &store.manifest());
        assert!(body.contains("port=7218"));
    }

    #[test]
    fn test_hyphenated_manifest_spelling_is_preserved_in_output() {
        // Arrange – internal state uses rate_limit, the manifest says rate-limit
        let mut store = fixture_store();
        store.set_value("net::rate-limit", 25).unwrap();

        // Act
        let body = render(&store, &store.manifest());

        // Assert – file shows the human-authored hyphenated spelling
        assert!(body.contains("rate-limit=25"));
        assert!(!body.contains("rate_limit="));
    }

    #[test]
    fn test_unknown_manifest_section_emits_no_header() {
        let store = fixture_store();
        let body = render(&store, &store.manifest());
        assert!(!body.contains("[ghost]"));
    }

    #[test]
    fn test_write_atomic_replaces_an_existing_target() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("web.ini");
        fs::write(&target, "old contents").unwrap();

        // Act
        write_atomic(&target, "new contents\n").unwrap();

        // Assert – target replaced, temp file gone
        assert_eq!(fs::read_to_string(&target).unwrap(), "new contents\n");
        assert!(!tmp_path(&target).exists());
    }

    #[test]
    fn test_write_atomic_creates_a_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh.ini");

        write_atomic(&target, "body\n").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "body\n");
    }

    #[test]
    fn test_write_atomic_into_a_missing_directory_fails_with_io_error() {
        let err = write_atomic(Path::new("/nonexistent/dir/web.ini"), "x").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
