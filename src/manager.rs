//! Localization file lifecycle manager.
//!
//! Owns one source resource and its derived targets: ingestion, target
//! naming, review-then-commit persistence, completeness checking, and
//! reset. Persistence is partial-failure tolerant: every target is
//! attempted, the first error is remembered and raised only after the
//! last attempt, and a default-named target colliding with an existing
//! file is committed under its locale-suffixed name instead of
//! overwriting (reported in the [`SaveReport`]).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{
    FormatError, LifecycleError, RenamedTarget, SaveError, SaveFailure, SaveReport, TranslateError,
};
use crate::i18n::{LocaleCatalog, LocaleHandle};
use crate::orchestrator::Orchestrator;
use crate::resource::{ParseMode, PropertyMap, SourceResource, TargetResource};

/// Lifecycle manager for one translation run.
pub struct ResourceManager {
    catalog: Arc<LocaleCatalog>,
    default_locale: LocaleHandle,
    source: Option<SourceResource>,
    targets: Vec<TargetResource>,
    target_dir: Option<PathBuf>,
}

impl ResourceManager {
    /// `default_locale` is the locale assumed for resources whose filename
    /// carries no locale suffix.
    pub fn new(catalog: Arc<LocaleCatalog>, default_locale: LocaleHandle) -> Self {
        Self {
            catalog,
            default_locale,
            source: None,
            targets: Vec::new(),
            target_dir: None,
        }
    }

    /// Ingest a source resource file. Supersedes any previous source and
    /// drops its targets.
    pub fn input(&mut self, path: &Path) -> Result<(), LifecycleError> {
        let source = SourceResource::ingest(&self.catalog, path)?;
        info!(
            "ingested source bundle {:?} ({} keys, locale {})",
            source.bundle(),
            source.content().len(),
            source.locale_code().unwrap_or("default")
        );
        self.source = Some(source);
        self.targets.clear();
        Ok(())
    }

    pub fn source(&self) -> Option<&SourceResource> {
        self.source.as_ref()
    }

    pub fn targets(&self) -> &[TargetResource] {
        &self.targets
    }

    /// Merge externally produced key-values (e.g. image captions) into the
    /// source content, as if originally present.
    pub fn include<I, K, V>(&mut self, extra: I) -> Result<(), LifecycleError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let source = self.source.as_mut().ok_or(LifecycleError::NoSource)?;
        source.include(extra);
        Ok(())
    }

    /// Create a target resource for a display language ("German, Austria").
    ///
    /// The file name is derived immediately; the path only once a target
    /// directory is known.
    pub fn new_target(
        &mut self,
        display_language: &str,
        is_default: bool,
    ) -> Result<&TargetResource, LifecycleError> {
        let source = self.source.as_ref().ok_or(LifecycleError::NoSource)?;
        let locale = LocaleHandle::resolve(&self.catalog, display_language)?;

        let mut target = TargetResource::new(locale, source.bundle(), is_default);
        if let Some(dir) = &self.target_dir {
            target.set_directory(dir);
        }

        self.targets.push(target);
        Ok(self.targets.last().expect("target just pushed"))
    }

    /// Stamp every current and future target's resolved path.
    pub fn set_target_directory(&mut self, dir: &Path) {
        for target in &mut self.targets {
            target.set_directory(dir);
        }
        self.target_dir = Some(dir.to_path_buf());
    }

    /// The source's locale, falling back to the configured default for an
    /// unqualified source.
    fn source_locale(&self, source: &SourceResource) -> LocaleHandle {
        source
            .locale_code()
            .and_then(|code| LocaleHandle::from_code(&self.catalog, code).ok())
            .unwrap_or_else(|| self.default_locale.clone())
    }

    /// Translate every target in request order, one at a time.
    ///
    /// Fails on the first target the orchestrator cannot complete; earlier
    /// targets keep their content so the caller can retry or fall back to
    /// manual mode for the rest.
    pub async fn translate_all(
        &mut self,
        orchestrator: &dyn Orchestrator,
    ) -> Result<(), TranslateError> {
        let source = self.source.as_ref().ok_or(TranslateError::NoSource)?;
        let source_locale = self.source_locale(source);

        for target in &mut self.targets {
            orchestrator
                .translate(source, &source_locale, target)
                .await?;
        }
        Ok(())
    }

    /// Serialize each target's content to a fresh temporary file for
    /// out-of-band editing. Returns the review paths; final destinations
    /// are untouched.
    pub fn review(&mut self) -> Result<Vec<PathBuf>, SaveError> {
        let mut paths = Vec::new();

        for target in &mut self.targets {
            let Some(content) = target.content() else {
                warn!("target {} has no content yet, skipping review", target.file_name());
                continue;
            };

            let mut file = NamedTempFile::new().map_err(|source| SaveError::Write {
                path: PathBuf::from(target.file_name()),
                source,
            })?;
            file.write_all(content.to_properties().as_bytes())
                .map_err(|source| SaveError::Write {
                    path: file.path().to_path_buf(),
                    source,
                })?;

            paths.push(file.path().to_path_buf());
            target.set_review_file(file);
        }

        Ok(paths)
    }

    /// Re-read edited review copies back into their targets, using the lax
    /// parse that permits cleared values.
    pub fn reload_reviews(&mut self) -> Result<(), FormatError> {
        for target in &mut self.targets {
            let Some(path) = target.review_path() else {
                continue;
            };
            let text = std::fs::read_to_string(path).map_err(|source| FormatError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let content = PropertyMap::parse(&text, ParseMode::Lax)?;
            target.set_content(content);
        }
        Ok(())
    }

    /// Persist every target: direct write for plain targets, review-copy
    /// commit for targets under review.
    ///
    /// All targets are attempted regardless of earlier failures; the first
    /// error is re-raised only after the last attempt, so one failing file
    /// never blocks the others. The failure carries the report for the
    /// targets that did commit.
    pub fn save_all(&mut self) -> Result<SaveReport, SaveFailure> {
        let mut report = SaveReport::default();
        let mut first_error: Option<SaveError> = None;

        for target in &mut self.targets {
            match Self::save_one(target, &mut report) {
                Ok(()) => report.written += 1,
                Err(e) => {
                    warn!("failed to save {}: {}", target.file_name(), e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(SaveFailure { error, report }),
            None => Ok(report),
        }
    }

    fn save_one(target: &mut TargetResource, report: &mut SaveReport) -> Result<(), SaveError> {
        let path = target.path().ok_or_else(|| SaveError::NoPath {
            name: target.file_name().to_string(),
        })?;

        // A default target never overwrites an existing file: it is demoted
        // to its locale-suffixed name and the rename is reported.
        if target.is_default() && path.exists() {
            target.rename_with_locale_suffix();
            report.renamed.push(RenamedTarget {
                locale_code: target.locale().code(),
                path: target
                    .path()
                    .expect("path survives rename")
                    .to_path_buf(),
            });
        }
        let path = target
            .path()
            .expect("path checked above")
            .to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SaveError::Write {
                path: path.clone(),
                source,
            })?;
        }

        if let Some(review) = target.take_review_file() {
            review
                .persist(&path)
                .map_err(|e| SaveError::Commit {
                    path: path.clone(),
                    source: e.error,
                })?;
        } else {
            let content = target.content().ok_or_else(|| SaveError::NoContent {
                name: target.file_name().to_string(),
            })?;
            std::fs::write(&path, content.to_properties()).map_err(|source| SaveError::Write {
                path: path.clone(),
                source,
            })?;
        }

        Ok(())
    }

    /// Check each target's key set against the source's.
    ///
    /// Any drifting target is repaired in place (keys present in the
    /// source but absent in the target are filled with empty values), and
    /// the drift is still reported: returns `true` only when every target
    /// was already complete.
    pub fn verify_complete(&mut self) -> bool {
        let Some(source) = self.source.as_ref() else {
            return false;
        };

        let mut complete = true;
        for target in &mut self.targets {
            match target.content_mut() {
                Some(content) => {
                    if !content.has_same_keys(source.content()) {
                        complete = false;
                        let filled = content.fill_missing_from(source.content());
                        if filled > 0 {
                            info!(
                                "repaired target {}: filled {} missing keys",
                                target.file_name(),
                                filled
                            );
                        }
                    }
                }
                None => {
                    complete = false;
                    let mut content = PropertyMap::new();
                    content.fill_missing_from(source.content());
                    target.set_content(content);
                }
            }
        }
        complete
    }

    /// Drop the source and every target.
    pub fn reset(&mut self) {
        self.source = None;
        self.targets.clear();
        self.target_dir = None;
    }
}
