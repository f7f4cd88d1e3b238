//! LocaleHandle: a resolved locale value.
//!
//! Derived deterministically either from a display string or from a code
//! string, immutable once constructed. Internal bookkeeping stays
//! English-keyed; a missing display name never breaks routing, which is
//! why code-based construction is lenient about unknown languages.

use crate::error::LocaleError;
use crate::i18n::LocaleCatalog;

/// A resolved locale: language, optional region, and their display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleHandle {
    language: String,
    region: Option<String>,
    display_language: String,
    display_region: Option<String>,
}

impl LocaleHandle {
    /// Resolve a free-form display string into a handle.
    ///
    /// Accepts `"Language"`, `"Language, Region"` (split on the first
    /// `", "`), and the `"Language (Region)"` shape that
    /// [`display_name`](Self::display_name) produces, so the two
    /// directions round-trip.
    pub fn resolve(catalog: &LocaleCatalog, display: &str) -> Result<Self, LocaleError> {
        let (language, region) = split_display(display);

        let key = match &region {
            Some(region) => format!("{}-{}", language.to_lowercase(), region.to_lowercase()),
            None => language.to_lowercase(),
        };

        let entry = catalog
            .entry_by_name(&key)
            .ok_or_else(|| LocaleError::NotSupported {
                name: display.to_string(),
            })?;

        Ok(Self {
            language: entry.language_code.to_string(),
            region: entry.region_code.map(str::to_string),
            display_language: entry.language_name.to_string(),
            display_region: entry.region_name.map(str::to_string),
        })
    }

    /// Construct a handle from a locale code such as `de`, `de-AT`,
    /// `de_AT` or `sr-Latn-RS`.
    ///
    /// Script subtags are recognized and ignored; the handle keeps only
    /// language and region. Unknown but well-formed codes still succeed
    /// with the code itself standing in for the display name, so routing
    /// never depends on a renderable name.
    pub fn from_code(catalog: &LocaleCatalog, code: &str) -> Result<Self, LocaleError> {
        let normalized = code.trim().replace('_', "-");
        let mut subtags = normalized.split('-');

        let language = subtags.next().unwrap_or("").to_lowercase();
        if language.len() != 2 || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LocaleError::BadCode {
                code: code.to_string(),
            });
        }

        // Region is a 2-letter alpha or 3-digit numeric subtag; 4-letter
        // subtags are scripts (Latn, Cyrl, ...) and are skipped.
        let mut region = None;
        for subtag in subtags {
            let is_alpha_region =
                subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic());
            let is_numeric_region = subtag.len() == 3 && subtag.chars().all(|c| c.is_ascii_digit());
            if is_alpha_region || is_numeric_region {
                region = Some(subtag.to_uppercase());
                break;
            }
        }

        let lookup_code = match &region {
            Some(region) => format!("{}-{}", language, region),
            None => language.clone(),
        };

        let (display_language, display_region) = match catalog.entry_by_code(&lookup_code) {
            Some(entry) => (
                entry.language_name.to_string(),
                entry.region_name.map(str::to_string),
            ),
            // The region may still be known even when the exact pair is not.
            None => match catalog.entry_by_code(&language) {
                Some(entry) => (
                    entry.language_name.to_string(),
                    region.as_deref().map(|r| {
                        catalog
                            .region_name(r)
                            .map_or_else(|| r.to_string(), str::to_string)
                    }),
                ),
                None => (language.clone(), region.clone()),
            },
        };

        Ok(Self {
            language,
            region,
            display_language,
            display_region,
        })
    }

    /// Canonical locale code, e.g. `en` or `es-ES`.
    pub fn code(&self) -> String {
        match &self.region {
            Some(region) => format!("{}-{}", self.language, region),
            None => self.language.clone(),
        }
    }

    /// 2-letter lowercase language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Uppercase region code, when region-qualified.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// English display name of the language alone.
    pub fn display_language(&self) -> &str {
        &self.display_language
    }

    /// English display name: `"Language (Region)"` when region-qualified,
    /// `"Language"` otherwise.
    pub fn display_name(&self) -> String {
        match &self.display_region {
            Some(region) => format!("{} ({})", self.display_language, region),
            None => self.display_language.clone(),
        }
    }

    /// Display name rendered in the given UI locale's language, falling
    /// back to the English name and finally to the bare code.
    pub fn display_name_in(&self, catalog: &LocaleCatalog, ui_locale: &LocaleHandle) -> String {
        catalog
            .localized_name(ui_locale.language(), &self.code())
            .map(str::to_string)
            .unwrap_or_else(|| self.display_name())
    }

    /// Whether two handles share a language, which makes translation
    /// between them a verbatim copy (e.g. target "English" against source
    /// "English (United States)").
    pub fn same_language(&self, other: &LocaleHandle) -> bool {
        self.language == other.language
    }
}

impl std::fmt::Display for LocaleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Split a display string into language and optional region parts.
fn split_display(display: &str) -> (String, Option<String>) {
    let display = display.trim();

    if let Some((language, region)) = display.split_once(", ") {
        return (language.to_string(), Some(region.trim().to_string()));
    }

    if let Some(open) = display.find(" (") {
        if let Some(stripped) = display.strip_suffix(')') {
            let language = &stripped[..open];
            let region = &stripped[open + 2..];
            return (language.to_string(), Some(region.to_string()));
        }
    }

    (display.to_string(), None)
}
