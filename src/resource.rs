//! Localization resources: the `.properties` codec and the source/target
//! resource types.
//!
//! A resource file is UTF-8 `key=value` lines; blank lines and
//! `#`-comments are ignored, insertion order is significant, keys are
//! unique. File names follow `bundle[_localeCode].properties`; absence of
//! a locale suffix marks the default resource.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::FormatError;
use crate::i18n::{LocaleCatalog, LocaleHandle};

/// File extension shared by every localization resource.
pub const RESOURCE_EXTENSION: &str = "properties";

/// How strictly `key=value` content is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Ingestion: every entry needs a non-empty key and a non-empty value.
    Strict,
    /// Review re-loads: empty values are permitted (a reviewer may clear one).
    Lax,
}

/// A flat, insertion-ordered mapping of string keys to string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` text. Fails with the first violated rule,
    /// identifying the offending line.
    pub fn parse(text: &str, mode: ParseMode) -> Result<Self, FormatError> {
        let mut map = Self::new();

        for (i, raw_line) in text.lines().enumerate() {
            let line = i + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if trimmed.matches('=').count() != 1 {
                return Err(FormatError::MalformedLine {
                    line,
                    text: trimmed.to_string(),
                });
            }

            let (key, value) = trimmed.split_once('=').unwrap_or((trimmed, ""));
            let key = key.trim();
            let value = value.trim();

            if key.is_empty() {
                return Err(FormatError::EmptyKey { line });
            }
            if value.is_empty() && mode == ParseMode::Strict {
                return Err(FormatError::EmptyValue {
                    line,
                    key: key.to_string(),
                });
            }
            if map.contains_key(key) {
                return Err(FormatError::DuplicateKey {
                    line,
                    key: key.to_string(),
                });
            }

            map.insert(key, value);
        }

        Ok(map)
    }

    /// Serialize back to `key=value` lines in insertion order.
    pub fn to_properties(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Insert or update a key, preserving the original position on update.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 = value.to_string(),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value.to_string()));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Merge externally supplied key-values, as if originally present.
    pub fn merge<I, K, V>(&mut self, extra: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in extra {
            self.insert(key.as_ref(), value.as_ref());
        }
    }

    /// Fill every key present in `reference` but absent here with an empty
    /// value. Returns how many keys were filled.
    pub fn fill_missing_from(&mut self, reference: &PropertyMap) -> usize {
        let mut filled = 0;
        for key in reference.keys() {
            if !self.contains_key(key) {
                self.insert(key, "");
                filled += 1;
            }
        }
        filled
    }

    /// Whether this map's key set equals the reference's exactly.
    pub fn has_same_keys(&self, reference: &PropertyMap) -> bool {
        self.len() == reference.len() && reference.keys().all(|k| self.contains_key(k))
    }
}

impl FromIterator<(String, String)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(&k, &v);
        }
        map
    }
}

/// Bundle name and optional locale suffix extracted from a resource file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileName {
    pub bundle: String,
    /// Raw suffix after the first `_`, underscores normalized to hyphens.
    pub locale_suffix: Option<String>,
}

/// Split `bundle[_localeCode].properties` into its parts.
pub fn parse_file_name(path: &Path) -> Result<ParsedFileName, FormatError> {
    let extension = path.extension().and_then(|e| e.to_str());
    if extension != Some(RESOURCE_EXTENSION) {
        return Err(FormatError::BadExtension {
            path: path.to_path_buf(),
        });
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FormatError::BadFileName {
            name: path.display().to_string(),
        })?;

    match stem.split_once('_') {
        Some((bundle, suffix)) if !bundle.is_empty() && !suffix.is_empty() => Ok(ParsedFileName {
            bundle: bundle.to_string(),
            locale_suffix: Some(suffix.replace('_', "-")),
        }),
        Some(_) => Err(FormatError::BadFileName {
            name: stem.to_string(),
        }),
        None => Ok(ParsedFileName {
            bundle: stem.to_string(),
            locale_suffix: None,
        }),
    }
}

/// Derive a target file name from a bundle and locale.
///
/// The locale handle carries only language and region (script subtags are
/// already stripped during resolution); remaining hyphens become
/// underscores, so `de-AT` yields `App_de_AT.properties`.
pub fn target_file_name(bundle: &str, locale: &LocaleHandle, is_default: bool) -> String {
    if is_default {
        format!("{}.{}", bundle, RESOURCE_EXTENSION)
    } else {
        format!(
            "{}_{}.{}",
            bundle,
            locale.code().replace('-', "_"),
            RESOURCE_EXTENSION
        )
    }
}

/// The one originating resource of a translation run.
#[derive(Debug)]
pub struct SourceResource {
    bundle: String,
    locale_code: Option<String>,
    is_default: bool,
    content: PropertyMap,
    origin: PathBuf,
}

impl SourceResource {
    /// Ingest a resource file: validate the extension, validate content
    /// well-formedness, extract bundle name and locale suffix.
    ///
    /// A suffix that does not parse as a locale code is treated as part of
    /// the bundle name (`my_app.properties` is a default resource named
    /// `my_app`, not an `app` locale).
    pub fn ingest(catalog: &LocaleCatalog, path: &Path) -> Result<Self, FormatError> {
        let parsed = parse_file_name(path)?;

        let text = std::fs::read_to_string(path).map_err(|source| FormatError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = PropertyMap::parse(&text, ParseMode::Strict)?;

        let (bundle, locale_code) = match parsed.locale_suffix {
            Some(suffix) => match LocaleHandle::from_code(catalog, &suffix) {
                Ok(handle) => (parsed.bundle, Some(handle.code())),
                Err(_) => (format!("{}_{}", parsed.bundle, suffix.replace('-', "_")), None),
            },
            None => (parsed.bundle, None),
        };

        Ok(Self {
            bundle,
            is_default: locale_code.is_none(),
            locale_code,
            content,
            origin: path.to_path_buf(),
        })
    }

    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// Locale code from the filename suffix; `None` means the default,
    /// unqualified locale.
    pub fn locale_code(&self) -> Option<&str> {
        self.locale_code.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn content(&self) -> &PropertyMap {
        &self.content
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Merge externally produced key-values (e.g. image-caption keys) into
    /// the content, as if originally present.
    pub fn include<I, K, V>(&mut self, extra: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.content.merge(extra);
    }
}

/// One derived resource per requested target locale.
#[derive(Debug)]
pub struct TargetResource {
    locale: LocaleHandle,
    bundle: String,
    file_name: String,
    is_default: bool,
    path: Option<PathBuf>,
    content: Option<PropertyMap>,
    review_file: Option<NamedTempFile>,
}

impl TargetResource {
    pub(crate) fn new(locale: LocaleHandle, bundle: &str, is_default: bool) -> Self {
        let file_name = target_file_name(bundle, &locale, is_default);
        Self {
            locale,
            bundle: bundle.to_string(),
            file_name,
            is_default,
            path: None,
            content: None,
            review_file: None,
        }
    }

    pub fn locale(&self) -> &LocaleHandle {
        &self.locale
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Resolved output path; set only once a target directory is known.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn set_directory(&mut self, dir: &Path) {
        self.path = Some(dir.join(&self.file_name));
    }

    pub fn content(&self) -> Option<&PropertyMap> {
        self.content.as_ref()
    }

    pub fn set_content(&mut self, content: PropertyMap) {
        self.content = Some(content);
    }

    pub(crate) fn content_mut(&mut self) -> Option<&mut PropertyMap> {
        self.content.as_mut()
    }

    /// Whether a review (temporary) copy is pending commit.
    pub fn under_review(&self) -> bool {
        self.review_file.is_some()
    }

    pub(crate) fn set_review_file(&mut self, file: NamedTempFile) {
        self.review_file = Some(file);
    }

    pub(crate) fn review_path(&self) -> Option<&Path> {
        self.review_file.as_ref().map(|f| f.path())
    }

    pub(crate) fn take_review_file(&mut self) -> Option<NamedTempFile> {
        self.review_file.take()
    }

    /// Demote a default target to its locale-suffixed name after a naming
    /// collision; recomputes name and path.
    pub(crate) fn rename_with_locale_suffix(&mut self) {
        self.is_default = false;
        self.file_name = target_file_name(&self.bundle, &self.locale, false);
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                self.path = Some(parent.join(&self.file_name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== PropertyMap Parsing Tests ====================

    #[test]
    fn test_parse_basic_content() {
        let map = PropertyMap::parse("a=1\nb=2\n", ParseMode::Strict).expect("parse");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get("b"), Some("2"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# header comment\n\na=1\n   \n# another\nb=2\n";
        let map = PropertyMap::parse(text, ParseMode::Strict).expect("parse");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_parse_preserves_insertion_order() {
        let map = PropertyMap::parse("z=1\na=2\nm=3\n", ParseMode::Strict).expect("parse");
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let err = PropertyMap::parse("a=1\nnovalue\n", ParseMode::Strict).unwrap_err();
        assert!(matches!(err, FormatError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_two_separators() {
        let err = PropertyMap::parse("a=1=2\n", ParseMode::Strict).unwrap_err();
        assert!(matches!(err, FormatError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        let err = PropertyMap::parse("=value\n", ParseMode::Strict).unwrap_err();
        assert!(matches!(err, FormatError::EmptyKey { line: 1 }));
    }

    #[test]
    fn test_parse_strict_rejects_empty_value() {
        let err = PropertyMap::parse("a=\n", ParseMode::Strict).unwrap_err();
        assert!(matches!(err, FormatError::EmptyValue { line: 1, .. }));
    }

    #[test]
    fn test_parse_lax_permits_empty_value() {
        let map = PropertyMap::parse("a=\nb=2\n", ParseMode::Lax).expect("parse");
        assert_eq!(map.get("a"), Some(""));
        assert_eq!(map.get("b"), Some("2"));
    }

    #[test]
    fn test_parse_rejects_duplicate_key() {
        let err = PropertyMap::parse("a=1\na=2\n", ParseMode::Strict).unwrap_err();
        assert!(matches!(err, FormatError::DuplicateKey { line: 2, .. }));
    }

    #[test]
    fn test_serialize_round_trip() {
        let text = "greeting=Hello\nfarewell=Goodbye\n";
        let map = PropertyMap::parse(text, ParseMode::Strict).expect("parse");
        assert_eq!(map.to_properties(), text);
    }

    // ==================== PropertyMap Operations Tests ====================

    #[test]
    fn test_insert_updates_in_place() {
        let mut map = PropertyMap::new();
        map.insert("a", "1");
        map.insert("b", "2");
        map.insert("a", "updated");

        let entries: Vec<(&str, &str)> = map.iter().collect();
        assert_eq!(entries, vec![("a", "updated"), ("b", "2")]);
    }

    #[test]
    fn test_merge_appends_new_keys() {
        let mut map = PropertyMap::parse("a=1\n", ParseMode::Strict).expect("parse");
        map.merge(vec![("img.caption", "a sunset"), ("a", "override")]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("img.caption"), Some("a sunset"));
        assert_eq!(map.get("a"), Some("override"));
    }

    #[test]
    fn test_fill_missing_from() {
        let source = PropertyMap::parse("a=1\nb=2\nc=3\n", ParseMode::Strict).expect("parse");
        let mut target = PropertyMap::parse("a=x\nb=y\n", ParseMode::Strict).expect("parse");

        let filled = target.fill_missing_from(&source);
        assert_eq!(filled, 1);
        assert_eq!(target.get("c"), Some(""));
        assert!(target.has_same_keys(&source));
    }

    #[test]
    fn test_has_same_keys_detects_extras() {
        let source = PropertyMap::parse("a=1\n", ParseMode::Strict).expect("parse");
        let target = PropertyMap::parse("a=1\nb=2\n", ParseMode::Strict).expect("parse");
        assert!(!target.has_same_keys(&source));
    }

    // ==================== File Name Tests ====================

    #[test]
    fn test_parse_file_name_with_locale() {
        let parsed = parse_file_name(Path::new("res/App_de_AT.properties")).expect("parse");
        assert_eq!(parsed.bundle, "App");
        assert_eq!(parsed.locale_suffix.as_deref(), Some("de-AT"));
    }

    #[test]
    fn test_parse_file_name_default() {
        let parsed = parse_file_name(Path::new("App.properties")).expect("parse");
        assert_eq!(parsed.bundle, "App");
        assert!(parsed.locale_suffix.is_none());
    }

    #[test]
    fn test_parse_file_name_rejects_bad_extension() {
        let err = parse_file_name(Path::new("App.txt")).unwrap_err();
        assert!(matches!(err, FormatError::BadExtension { .. }));
        assert!(parse_file_name(Path::new("App")).is_err());
    }

    #[test]
    fn test_target_file_name_region_qualified() {
        let catalog = LocaleCatalog::builtin();
        let locale = LocaleHandle::from_code(&catalog, "de-AT").expect("locale");
        assert_eq!(
            target_file_name("App", &locale, false),
            "App_de_AT.properties"
        );
    }

    #[test]
    fn test_target_file_name_default() {
        let catalog = LocaleCatalog::builtin();
        let locale = LocaleHandle::from_code(&catalog, "de-AT").expect("locale");
        assert_eq!(target_file_name("App", &locale, true), "App.properties");
    }

    #[test]
    fn test_target_file_name_script_tag_stripped() {
        let catalog = LocaleCatalog::builtin();
        let locale = LocaleHandle::from_code(&catalog, "sr-Latn-RS").expect("locale");
        assert_eq!(
            target_file_name("App", &locale, false),
            "App_sr_RS.properties"
        );
    }

    // ==================== SourceResource Tests ====================

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write temp resource");
        path
    }

    #[test]
    fn test_ingest_default_resource() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "App.properties", "a=1\nb=2\n");

        let source = SourceResource::ingest(&LocaleCatalog::builtin(), &path).expect("ingest");
        assert_eq!(source.bundle(), "App");
        assert!(source.is_default());
        assert!(source.locale_code().is_none());
        assert_eq!(source.content().len(), 2);
    }

    #[test]
    fn test_ingest_locale_suffixed_resource() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "App_en_US.properties", "a=1\n");

        let source = SourceResource::ingest(&LocaleCatalog::builtin(), &path).expect("ingest");
        assert_eq!(source.bundle(), "App");
        assert_eq!(source.locale_code(), Some("en-US"));
        assert!(!source.is_default());
    }

    #[test]
    fn test_ingest_underscore_bundle_without_locale() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "my_app.properties", "a=1\n");

        let source = SourceResource::ingest(&LocaleCatalog::builtin(), &path).expect("ingest");
        assert_eq!(source.bundle(), "my_app");
        assert!(source.is_default());
    }

    #[test]
    fn test_ingest_rejects_malformed_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "App.properties", "a=1\nbroken line\n");

        let err = SourceResource::ingest(&LocaleCatalog::builtin(), &path).unwrap_err();
        assert!(matches!(err, FormatError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_include_merges_into_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "App.properties", "a=1\n");

        let mut source = SourceResource::ingest(&LocaleCatalog::builtin(), &path).expect("ingest");
        source.include(vec![("caption.logo", "company logo")]);
        assert_eq!(source.content().get("caption.logo"), Some("company logo"));
    }

    // ==================== TargetResource Tests ====================

    #[test]
    fn test_target_path_unset_until_directory_known() {
        let catalog = LocaleCatalog::builtin();
        let locale = LocaleHandle::from_code(&catalog, "de-AT").expect("locale");
        let mut target = TargetResource::new(locale, "App", false);

        assert!(target.path().is_none());
        assert_eq!(target.file_name(), "App_de_AT.properties");

        target.set_directory(Path::new("/out/l10n"));
        assert_eq!(
            target.path(),
            Some(Path::new("/out/l10n/App_de_AT.properties"))
        );
    }

    #[test]
    fn test_rename_with_locale_suffix() {
        let catalog = LocaleCatalog::builtin();
        let locale = LocaleHandle::from_code(&catalog, "de-AT").expect("locale");
        let mut target = TargetResource::new(locale, "App", true);
        target.set_directory(Path::new("/out"));
        assert_eq!(target.file_name(), "App.properties");

        target.rename_with_locale_suffix();
        assert!(!target.is_default());
        assert_eq!(target.file_name(), "App_de_AT.properties");
        assert_eq!(target.path(), Some(Path::new("/out/App_de_AT.properties")));
    }

    #[test]
    fn test_numeric_directory_names_survive_in_paths() {
        let catalog = LocaleCatalog::builtin();
        let locale = LocaleHandle::from_code(&catalog, "es-419").expect("locale");
        let mut target = TargetResource::new(locale, "App", false);
        target.set_directory(Path::new("/builds/2024/output"));

        assert_eq!(
            target.path(),
            Some(Path::new("/builds/2024/output/App_es_419.properties"))
        );
    }
}
