//! Geometry resolution error types - re-exports unified GlimpseError from glimpse-core
//!
//! Resolution failures carry one of three kinds:
//! - MalformedBounds(String) - an unparseable bounds encoding
//! - ElementNotFound(String) - a target element query matched nothing
//! - DriverFailure(String) - any other automation driver error, surfaced verbatim
//!
//! Driver implementations should report "no such element" as `ElementNotFound`
//! so exclusion queries can tolerate it.

pub use glimpse_core::{GlimpseError, Result};
