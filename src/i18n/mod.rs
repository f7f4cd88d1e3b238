//! Locale resolution: bidirectional mapping between human display names
//! ("German (Austria)") and normalized locale codes ("de-AT").
//!
//! The catalog is an explicitly constructed, immutable lookup table passed
//! by reference to every consumer, so tests can substitute a minimal
//! locale set instead of relying on process-global state.
//!
//! # Example
//!
//! ```rust,ignore
//! use locsmith::i18n::{LocaleCatalog, LocaleHandle};
//!
//! let catalog = LocaleCatalog::builtin();
//! let austrian = LocaleHandle::resolve(&catalog, "German, Austria")?;
//! assert_eq!(austrian.code(), "de-AT");
//! assert_eq!(austrian.display_name(), "German (Austria)");
//! ```

mod catalog;
mod locale;

pub use catalog::{LocaleCatalog, LocaleEntry};
pub use locale::LocaleHandle;
