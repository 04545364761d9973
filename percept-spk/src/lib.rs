//! percept-spk: human-readable rendering of detection output
//!
//! Pure, side-effect-free formatting of detection batches into per-locale
//! text for downstream display and speech consumers. All lookups are
//! data-driven tables with fallback to the raw token.

pub mod formatter;
pub mod locale;

pub use formatter::{nearest, summary};
pub use locale::Locale;
