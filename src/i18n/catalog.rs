//! Locale catalog: the lookup tables behind locale resolution.
//!
//! One [`LocaleEntry`] per supported locale, indexed both by English
//! display name (lower-cased, `language` or `language-region`) and by
//! normalized code. The catalog is built once and never mutated; consumers
//! receive it by reference.

use std::collections::HashMap;

/// A single supported locale.
#[derive(Debug, Clone)]
pub struct LocaleEntry {
    /// ISO 639-1 language code, lowercase (e.g., "de")
    pub language_code: &'static str,

    /// Region code, uppercase, when the locale is region-qualified (e.g., "AT")
    pub region_code: Option<&'static str>,

    /// English name of the language (e.g., "German")
    pub language_name: &'static str,

    /// English name of the region (e.g., "Austria")
    pub region_name: Option<&'static str>,
}

impl LocaleEntry {
    /// Canonical locale code, e.g. `de` or `de-AT`.
    pub fn code(&self) -> String {
        match self.region_code {
            Some(region) => format!("{}-{}", self.language_code, region),
            None => self.language_code.to_string(),
        }
    }

    fn name_key(&self) -> String {
        match self.region_name {
            Some(region) => format!(
                "{}-{}",
                self.language_name.to_lowercase(),
                region.to_lowercase()
            ),
            None => self.language_name.to_lowercase(),
        }
    }
}

/// Immutable name <-> code lookup tables for every supported locale.
///
/// Bookkeeping is always English-keyed; per-UI-locale display tables can
/// be attached so menus list languages in the user's own language without
/// affecting routing.
pub struct LocaleCatalog {
    entries: Vec<LocaleEntry>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
    display_tables: HashMap<String, HashMap<String, String>>,
}

impl LocaleCatalog {
    /// Build a catalog from an explicit set of entries.
    pub fn from_entries(entries: Vec<LocaleEntry>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_code = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            by_name.insert(entry.name_key(), i);
            by_code.insert(entry.code().to_lowercase(), i);
        }
        Self {
            entries,
            by_name,
            by_code,
            display_tables: HashMap::new(),
        }
    }

    /// The full built-in locale set.
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries())
    }

    /// Attach a display-name table for one UI locale.
    ///
    /// `table` maps locale codes (e.g. "de-AT") to names rendered in the
    /// UI locale (e.g. "Alemán (Austria)" for a Spanish UI).
    pub fn with_display_table(
        mut self,
        ui_language_code: &str,
        table: HashMap<String, String>,
    ) -> Self {
        self.display_tables
            .insert(ui_language_code.to_lowercase(), table);
        self
    }

    /// Look up an entry by its English name key ("german" or "german-austria").
    pub(crate) fn entry_by_name(&self, key: &str) -> Option<&LocaleEntry> {
        self.by_name.get(key).map(|&i| &self.entries[i])
    }

    /// Look up an entry by normalized code ("de" or "de-AT", case-insensitive).
    pub(crate) fn entry_by_code(&self, code: &str) -> Option<&LocaleEntry> {
        self.by_code.get(&code.to_lowercase()).map(|&i| &self.entries[i])
    }

    /// The English region name for a code, resolved independently of the
    /// language ("AT" -> "Austria").
    pub(crate) fn region_name(&self, region_code: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.region_code == Some(region_code))
            .and_then(|e| e.region_name)
    }

    /// Localized display name for `code` in the given UI language, if a
    /// table was attached and has an entry.
    pub(crate) fn localized_name(&self, ui_language_code: &str, code: &str) -> Option<&str> {
        self.display_tables
            .get(&ui_language_code.to_lowercase())
            .and_then(|table| table.get(code))
            .map(String::as_str)
    }

    /// All entries, in declaration order.
    pub fn entries(&self) -> &[LocaleEntry] {
        &self.entries
    }
}

impl std::fmt::Debug for LocaleCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleCatalog")
            .field("entries", &self.entries.len())
            .field("display_tables", &self.display_tables.len())
            .finish()
    }
}

macro_rules! locale {
    ($lang:literal, $name:literal) => {
        LocaleEntry {
            language_code: $lang,
            region_code: None,
            language_name: $name,
            region_name: None,
        }
    };
    ($lang:literal, $region:literal, $name:literal, $region_name:literal) => {
        LocaleEntry {
            language_code: $lang,
            region_code: Some($region),
            language_name: $name,
            region_name: Some($region_name),
        }
    };
}

fn builtin_entries() -> Vec<LocaleEntry> {
    vec![
        locale!("en", "English"),
        locale!("en", "US", "English", "United States"),
        locale!("en", "GB", "English", "United Kingdom"),
        locale!("en", "AU", "English", "Australia"),
        locale!("en", "CA", "English", "Canada"),
        locale!("de", "German"),
        locale!("de", "DE", "German", "Germany"),
        locale!("de", "AT", "German", "Austria"),
        locale!("de", "CH", "German", "Switzerland"),
        locale!("es", "Spanish"),
        locale!("es", "ES", "Spanish", "Spain"),
        locale!("es", "MX", "Spanish", "Mexico"),
        locale!("es", "AR", "Spanish", "Argentina"),
        locale!("es", "419", "Spanish", "Latin America"),
        locale!("fr", "French"),
        locale!("fr", "FR", "French", "France"),
        locale!("fr", "CA", "French", "Canada"),
        locale!("fr", "BE", "French", "Belgium"),
        locale!("it", "Italian"),
        locale!("it", "IT", "Italian", "Italy"),
        locale!("pt", "Portuguese"),
        locale!("pt", "PT", "Portuguese", "Portugal"),
        locale!("pt", "BR", "Portuguese", "Brazil"),
        locale!("nl", "Dutch"),
        locale!("sv", "Swedish"),
        locale!("da", "Danish"),
        locale!("nb", "Norwegian"),
        locale!("fi", "Finnish"),
        locale!("pl", "Polish"),
        locale!("cs", "Czech"),
        locale!("sk", "Slovak"),
        locale!("hu", "Hungarian"),
        locale!("ro", "Romanian"),
        locale!("ru", "Russian"),
        locale!("uk", "Ukrainian"),
        locale!("bg", "Bulgarian"),
        locale!("sr", "Serbian"),
        locale!("sr", "RS", "Serbian", "Serbia"),
        locale!("hr", "Croatian"),
        locale!("sl", "Slovenian"),
        locale!("el", "Greek"),
        locale!("tr", "Turkish"),
        locale!("ar", "Arabic"),
        locale!("he", "Hebrew"),
        locale!("hi", "Hindi"),
        locale!("th", "Thai"),
        locale!("vi", "Vietnamese"),
        locale!("ja", "Japanese"),
        locale!("ja", "JP", "Japanese", "Japan"),
        locale!("ko", "Korean"),
        locale!("ko", "KR", "Korean", "South Korea"),
        locale!("zh", "Chinese"),
        locale!("zh", "CN", "Chinese", "China"),
        locale!("zh", "TW", "Chinese", "Taiwan"),
    ]
}
