//! Persistent translation cache.
//!
//! Content-addressed store mapping `(text_hash, language_code)` to a
//! previously obtained translation. The hash is a SHA-512 digest of the
//! UTF-8 bytes of the *source* text, so identical content is reusable
//! across runs and files. Entries are immutable after insertion: a second
//! insert for the same key is a no-op, never an overwrite.
//!
//! The cache is an optimization, never a required dependency: any storage
//! error degrades to "not found" on the read path and "store skipped" on
//! the write path. A connection is opened per logical operation rather
//! than held for a run's duration.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha512};
use std::path::PathBuf;
use tracing::warn;

use crate::resource::PropertyMap;

/// Per-call split of a content map into cache hits and misses for one
/// target locale code. Not persisted.
#[derive(Debug, Default)]
pub struct TranslationBatch {
    /// key -> cached translation
    pub hits: PropertyMap,
    /// key -> original text that still needs translating
    pub misses: PropertyMap,
}

/// SQLite-backed translation cache.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    db_path: PathBuf,
}

impl TranslationCache {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Open a connection and make sure the schema exists.
    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("failed to open translation cache at {:?}", self.db_path))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS translation_cache (
                text_hash TEXT NOT NULL,
                language_code TEXT NOT NULL,
                text_translation TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (text_hash, language_code)
            )",
            [],
        )
        .context("failed to create translation_cache table")?;

        Ok(conn)
    }

    /// SHA-512 hex digest of a source text.
    pub fn hash_text(text: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            hex.push_str(&format!("{:02x}", byte));
        }
        hex
    }

    /// Split `content` into cache hits and misses for `locale_code`.
    ///
    /// One lookup per key; a connectivity or storage error turns the whole
    /// batch (or the affected item) into misses instead of failing the run.
    pub fn match_content(&self, content: &PropertyMap, locale_code: &str) -> TranslationBatch {
        let mut batch = TranslationBatch::default();

        let conn = match self.open() {
            Ok(conn) => conn,
            Err(e) => {
                warn!("translation cache unavailable, treating all as misses: {e:#}");
                for (key, value) in content.iter() {
                    batch.misses.insert(key, value);
                }
                return batch;
            }
        };

        for (key, original) in content.iter() {
            let hash = Self::hash_text(original);
            let cached: Option<String> = conn
                .query_row(
                    "SELECT text_translation FROM translation_cache
                     WHERE text_hash = ?1 AND language_code = ?2",
                    params![hash, locale_code],
                    |row| row.get(0),
                )
                .optional()
                .unwrap_or_else(|e| {
                    warn!("cache lookup failed for key {key:?}, treating as miss: {e}");
                    None
                });

            match cached {
                Some(translation) => batch.hits.insert(key, &translation),
                None => batch.misses.insert(key, original),
            }
        }

        batch
    }

    /// Store freshly translated results under the hash of their originals.
    ///
    /// Keys with empty translations are skipped, as are keys without a
    /// matching original. Duplicate-key inserts are swallowed (first write
    /// wins); storage errors are logged and otherwise ignored.
    pub fn store_all(&self, results: &PropertyMap, originals: &PropertyMap, locale_code: &str) {
        let conn = match self.open() {
            Ok(conn) => conn,
            Err(e) => {
                warn!("translation cache unavailable, skipping store: {e:#}");
                return;
            }
        };

        let created_at = Utc::now().to_rfc3339();

        for (key, translation) in results.iter() {
            if translation.is_empty() {
                continue;
            }
            let Some(original) = originals.get(key) else {
                continue;
            };

            let hash = Self::hash_text(original);
            if let Err(e) = conn.execute(
                "INSERT OR IGNORE INTO translation_cache
                 (text_hash, language_code, text_translation, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![hash, locale_code, translation, created_at],
            ) {
                warn!("cache store skipped for key {key:?}: {e}");
            }
        }
    }

    /// Delete all entries. Test/maintenance only, never on the user path.
    pub fn reset(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM translation_cache", [])
            .context("failed to reset translation cache")?;
        Ok(())
    }

    /// Number of stored entries. Maintenance helper.
    pub fn entry_count(&self) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM translation_cache", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ParseMode;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    fn create_test_cache() -> (TranslationCache, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cache = TranslationCache::new(temp_dir.path().join("cache.db"));
        (cache, temp_dir)
    }

    fn props(text: &str) -> PropertyMap {
        PropertyMap::parse(text, ParseMode::Lax).expect("parse")
    }

    // ==================== Hashing Tests ====================

    #[test]
    fn test_hash_is_fixed_length_hex() {
        let hash = TranslationCache::hash_text("hello");
        assert_eq!(hash.len(), 128); // SHA-512 = 64 bytes = 128 hex chars
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_is_deterministic_and_content_sensitive() {
        assert_eq!(
            TranslationCache::hash_text("hello"),
            TranslationCache::hash_text("hello")
        );
        assert_ne!(
            TranslationCache::hash_text("hello"),
            TranslationCache::hash_text("hello ")
        );
    }

    // ==================== Round-Trip Tests ====================

    #[test]
    fn test_store_then_match_round_trip() {
        let (cache, _dir) = create_test_cache();

        cache.store_all(&props("k=hola\n"), &props("k=hello\n"), "es");

        let batch = cache.match_content(&props("k=hello\n"), "es");
        assert_eq!(batch.hits.get("k"), Some("hola"));
        assert!(batch.misses.is_empty());
    }

    #[test]
    fn test_match_unknown_content_is_all_misses() {
        let (cache, _dir) = create_test_cache();

        let batch = cache.match_content(&props("a=one\nb=two\n"), "es");
        assert!(batch.hits.is_empty());
        assert_eq!(batch.misses.len(), 2);
        assert_eq!(batch.misses.get("a"), Some("one"));
    }

    #[test]
    fn test_match_partial_hits_and_misses() {
        let (cache, _dir) = create_test_cache();

        cache.store_all(&props("a=uno\n"), &props("a=one\n"), "es");

        let batch = cache.match_content(&props("a=one\nb=two\n"), "es");
        assert_eq!(batch.hits.get("a"), Some("uno"));
        assert_eq!(batch.misses.get("b"), Some("two"));
        assert_eq!(batch.hits.len(), 1);
        assert_eq!(batch.misses.len(), 1);
    }

    #[test]
    fn test_hit_is_keyed_by_content_not_key_name() {
        let (cache, _dir) = create_test_cache();

        // Same source text under a different key still hits.
        cache.store_all(&props("k1=hola\n"), &props("k1=hello\n"), "es");

        let batch = cache.match_content(&props("other.key=hello\n"), "es");
        assert_eq!(batch.hits.get("other.key"), Some("hola"));
    }

    // ==================== Locale Isolation Tests ====================

    #[test]
    fn test_cache_isolation_by_locale() {
        let (cache, _dir) = create_test_cache();

        cache.store_all(&props("k=hola\n"), &props("k=hello\n"), "es");

        let batch = cache.match_content(&props("k=hello\n"), "fr");
        assert!(batch.hits.is_empty());
        assert_eq!(batch.misses.get("k"), Some("hello"));
    }

    // ==================== Idempotency Tests ====================

    #[test]
    fn test_duplicate_store_is_first_write_wins() {
        let (cache, _dir) = create_test_cache();

        cache.store_all(&props("k=hola\n"), &props("k=hello\n"), "es");
        // Second attempt with a different translation must not overwrite.
        cache.store_all(&props("k=buenas\n"), &props("k=hello\n"), "es");

        let batch = cache.match_content(&props("k=hello\n"), "es");
        assert_eq!(batch.hits.get("k"), Some("hola"));
        assert_eq!(cache.entry_count().expect("count"), 1);
    }

    #[test]
    fn test_store_all_twice_yields_one_entry_and_no_error() {
        let (cache, _dir) = create_test_cache();

        cache.store_all(&props("k=hola\n"), &props("k=hello\n"), "es");
        cache.store_all(&props("k=hola\n"), &props("k=hello\n"), "es");

        assert_eq!(cache.entry_count().expect("count"), 1);
    }

    // ==================== Store Filtering Tests ====================

    #[test]
    fn test_store_skips_empty_translations() {
        let (cache, _dir) = create_test_cache();

        cache.store_all(&props("k=\n"), &props("k=hello\n"), "es");
        assert_eq!(cache.entry_count().expect("count"), 0);
    }

    #[test]
    fn test_store_skips_results_without_originals() {
        let (cache, _dir) = create_test_cache();

        cache.store_all(&props("orphan=hola\n"), &props("k=hello\n"), "es");
        assert_eq!(cache.entry_count().expect("count"), 0);
    }

    // ==================== Failure Degradation Tests ====================

    #[test]
    fn test_unreachable_store_degrades_to_misses() {
        let cache = TranslationCache::new("/nonexistent/dir/cache.db");

        let batch = cache.match_content(&props("k=hello\n"), "es");
        assert!(batch.hits.is_empty());
        assert_eq!(batch.misses.get("k"), Some("hello"));

        // Store must not panic or error either.
        cache.store_all(&props("k=hola\n"), &props("k=hello\n"), "es");
    }

    // ==================== Persistence Tests ====================

    #[test]
    fn test_entries_survive_reopening() {
        let temp_dir = TempDir::new().expect("tempdir");
        let db_path = temp_dir.path().join("cache.db");

        {
            let cache = TranslationCache::new(&db_path);
            cache.store_all(&props("k=hola\n"), &props("k=hello\n"), "es");
        }

        let cache = TranslationCache::new(&db_path);
        let batch = cache.match_content(&props("k=hello\n"), "es");
        assert_eq!(batch.hits.get("k"), Some("hola"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let (cache, _dir) = create_test_cache();

        cache.store_all(&props("a=uno\nb=dos\n"), &props("a=one\nb=two\n"), "es");
        assert_eq!(cache.entry_count().expect("count"), 2);

        cache.reset().expect("reset");
        assert_eq!(cache.entry_count().expect("count"), 0);

        let batch = cache.match_content(&props("a=one\n"), "es");
        assert!(batch.hits.is_empty());
    }
}
