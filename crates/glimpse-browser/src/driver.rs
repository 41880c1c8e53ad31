//! Automation driver capabilities consumed by the geometry resolver
//!
//! The resolver never talks to a browser or device directly. It needs a
//! small capability surface from whatever automation driver is in use:
//! script execution plus element queries for live pages, or a UI-tree dump
//! for native apps. Both traits can be mocked in tests (see [`crate::mock`]).

use async_trait::async_trait;
use glimpse_core::{BoundingBox, ScreenSize};

use crate::error::Result;

/// Opaque reference to one element matched by a live selector query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    selector: String,
    index: usize,
}

impl ElementHandle {
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }

    /// Selector this handle was matched by
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Position among the selector's matches, in document order
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Driver for a live, script-executing web backend
#[async_trait]
pub trait LiveDriver: Send + Sync {
    /// Evaluate a JavaScript expression in the page and return its JSON value
    async fn execute_in_page(&self, script: &str) -> Result<serde_json::Value>;

    /// All elements matching `selector`, in document order
    ///
    /// Zero matches may be reported as an empty list or as
    /// [`GlimpseError::ElementNotFound`](crate::GlimpseError::ElementNotFound).
    async fn query_elements(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// Bounding box of a previously matched element
    async fn bounding_box(&self, handle: &ElementHandle) -> Result<BoundingBox>;
}

/// Driver for a backend limited to static UI-tree dumps
#[async_trait]
pub trait SnapshotDriver: Send + Sync {
    /// Current UI tree as an XML document
    async fn ui_tree_snapshot(&self) -> Result<String>;

    /// Viewport size, for drivers that can report it
    async fn screen_size(&self) -> Result<Option<ScreenSize>> {
        Ok(None)
    }
}
