//! Translation core for `.properties` localization bundles.
//!
//! A source resource file is ingested, target resources are derived for
//! the requested locales, and each target is filled either automatically
//! (persistent cache plus an external translation service) or manually.
//! Targets can be reviewed out of band before being committed to disk.
//!
//! The [`manager::ResourceManager`] drives the lifecycle; the
//! [`orchestrator`] module decides per target what actually gets computed.

pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;
pub mod manager;
pub mod orchestrator;
pub mod resource;
pub mod retry;
pub mod service;
pub mod speech;

pub use cache::TranslationCache;
pub use config::Config;
pub use error::{
    FormatError, LifecycleError, LocaleError, SaveError, SaveFailure, SaveReport, TranslateError,
};
pub use i18n::{LocaleCatalog, LocaleHandle};
pub use manager::ResourceManager;
pub use orchestrator::{AutoTranslator, ManualTranslator, Orchestrator};
pub use resource::{ParseMode, PropertyMap, SourceResource, TargetResource};
pub use service::{HttpTranslator, TranslationService};
