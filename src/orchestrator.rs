//! Translation orchestrators.
//!
//! [`AutoTranslator`] decides, per (source, target locale) pair, what must
//! actually be computed: same-language targets are copied verbatim, cached
//! translations are reused, and only cache misses reach the external
//! service. Results are merged in source order and written back to the
//! cache. [`ManualTranslator`] copies the source content as-is so a human
//! can fill in the values out of band.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cache::TranslationCache;
use crate::error::TranslateError;
use crate::i18n::LocaleHandle;
use crate::resource::{PropertyMap, SourceResource, TargetResource};
use crate::service::{is_quota_error, TranslationService};

/// Per-target translation strategy.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Produce the target's content from the source. All-or-nothing: on
    /// error the target's content is left unset.
    async fn translate(
        &self,
        source: &SourceResource,
        source_locale: &LocaleHandle,
        target: &mut TargetResource,
    ) -> Result<(), TranslateError>;
}

/// Cache-backed automatic translation through an external service.
pub struct AutoTranslator<S> {
    cache: TranslationCache,
    service: S,
}

impl<S: TranslationService> AutoTranslator<S> {
    pub fn new(cache: TranslationCache, service: S) -> Self {
        Self { cache, service }
    }
}

#[async_trait]
impl<S: TranslationService> Orchestrator for AutoTranslator<S> {
    async fn translate(
        &self,
        source: &SourceResource,
        source_locale: &LocaleHandle,
        target: &mut TargetResource,
    ) -> Result<(), TranslateError> {
        let target_code = target.locale().code();

        // Same language (or a global variant of it, e.g. target "English"
        // against source "English (United States)"): copy verbatim, skip
        // cache and service entirely.
        if target.locale().same_language(source_locale) {
            debug!("target {target_code} shares language with source, copying content");
            target.set_content(source.content().clone());
            return Ok(());
        }

        let batch = self.cache.match_content(source.content(), &target_code);
        info!(
            "translating to {}: {} cache hits, {} misses",
            target_code,
            batch.hits.len(),
            batch.misses.len()
        );

        let external = if batch.misses.is_empty() {
            PropertyMap::new()
        } else {
            self.service
                .translate(
                    &batch.misses,
                    &source_locale.display_name(),
                    &target.locale().display_name(),
                )
                .await
                .map_err(|e| {
                    if is_quota_error(&e) {
                        TranslateError::QuotaExhausted {
                            target: target_code.clone(),
                        }
                    } else {
                        TranslateError::ServiceFailed {
                            target: target_code.clone(),
                            message: format!("{e:#}"),
                        }
                    }
                })?
        };

        // Merge in source order; external results take precedence, though
        // by construction the key sets are disjoint.
        let mut result = PropertyMap::new();
        for (key, _) in source.content().iter() {
            if let Some(text) = external.get(key) {
                result.insert(key, text);
            } else if let Some(text) = batch.hits.get(key) {
                result.insert(key, text);
            } else {
                // The service dropped a key; committing would leave the
                // target half-translated.
                return Err(TranslateError::ServiceFailed {
                    target: target_code,
                    message: format!("service returned no translation for key {key:?}"),
                });
            }
        }

        target.set_content(result);

        if !external.is_empty() {
            self.cache
                .store_all(&external, source.content(), &target_code);
        }

        Ok(())
    }
}

/// Manual mode: the target receives the source content verbatim; the key
/// set is the meaningful artifact, values are replaced by hand.
pub struct ManualTranslator;

#[async_trait]
impl Orchestrator for ManualTranslator {
    async fn translate(
        &self,
        source: &SourceResource,
        _source_locale: &LocaleHandle,
        target: &mut TargetResource,
    ) -> Result<(), TranslateError> {
        target.set_content(source.content().clone());
        Ok(())
    }
}
