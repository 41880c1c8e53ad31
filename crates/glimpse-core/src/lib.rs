//! # glimpse-core
//!
//! Core types for the Glimpse visual-regression geometry engine.
//!
//! Before a screenshot is compared against its baseline, the harness needs to
//! know where the page is scrolled, how large the viewport is, where the
//! element under test sits, and which regions must be masked out. This crate
//! holds the backend-agnostic half of that work:
//!
//! - [`Rect`], [`ScrollPos`] and [`PageInfo`]: the geometry record handed to the diff engine
//! - [`bounds`]: decoding of live and UI-tree bounds encodings into a [`Rect`]
//! - [`exclusion`]: splitting a mixed exclusion argument into queries and literal rectangles
//! - [`config`]: `.glimpse/config.toml` loading

pub mod bounds;
pub mod config;
mod error;
pub mod exclusion;
mod types;

pub use config::{BackendMode, BrowserSettings, GlimpseConfig};
pub use error::{GlimpseError, Result};
pub use exclusion::{normalize_exclusions, ExclusionSpec, Exclusions};
pub use types::*;
