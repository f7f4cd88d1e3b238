//! Error taxonomy for the translation core.
//!
//! Four classes with different recovery policies: format errors are fatal
//! to the ingestion attempt, locale errors block the request, translation
//! errors let the caller fall back to manual mode, and persistence errors
//! are partial-failure tolerant (attempt everything, report the first
//! failure afterwards). Recoverable outcomes like "renamed on save
//! conflict" travel as data in [`SaveReport`], never as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed input file or content. Always fatal to the ingestion attempt.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unsupported file extension for {path:?}, expected .properties")]
    BadExtension { path: PathBuf },

    #[error("invalid resource file name {name:?}")]
    BadFileName { name: String },

    #[error("line {line}: expected exactly one '=' separator: {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("line {line}: empty key")]
    EmptyKey { line: usize },

    #[error("line {line}: empty value for key {key:?}")]
    EmptyValue { line: usize, key: String },

    #[error("line {line}: duplicate key {key:?}")]
    DuplicateKey { line: usize, key: String },

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Locale resolution failure: the display name or code is not in the catalog.
#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("unsupported locale {name:?}")]
    NotSupported { name: String },

    #[error("malformed locale code {code:?}")]
    BadCode { code: String },
}

/// External translation failure, tagged with the mode that produced it so
/// the caller can offer a manual fallback. The target is never left
/// half-translated: on error its content stays unset.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("automatic translation to {target} failed: {message}")]
    ServiceFailed { target: String, message: String },

    #[error("translation service quota exhausted while translating to {target}")]
    QuotaExhausted { target: String },

    #[error("no source resource loaded")]
    NoSource,
}

/// Failures of lifecycle preconditions and their underlying causes.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Locale(#[from] LocaleError),

    #[error("no source resource loaded")]
    NoSource,
}

/// Persistence failure while writing or moving a target resource.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move review copy into {path:?}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("target {name:?} has no resolved path; call set_target_directory first")]
    NoPath { name: String },

    #[error("target {name:?} has no content to save")]
    NoContent { name: String },
}

/// A bulk save in which at least one target failed. Carries the report
/// for the targets that did commit, so recoverable signals such as
/// renamed-on-conflict survive a mixed outcome.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SaveFailure {
    /// First error encountered; every target was still attempted.
    pub error: SaveError,
    /// Outcome of the targets that were saved despite the failure.
    pub report: SaveReport,
}

/// A default-named target that collided with an existing file and was
/// committed under its locale-suffixed name instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedTarget {
    /// Locale code of the renamed target.
    pub locale_code: String,
    /// Path the target was actually committed to.
    pub path: PathBuf,
}

/// Outcome of a bulk save. Produced even when some targets failed, since
/// every target is attempted regardless of earlier failures.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Number of targets written or committed.
    pub written: usize,
    /// Default targets renamed to a locale-suffixed name on collision.
    pub renamed: Vec<RenamedTarget>,
}
