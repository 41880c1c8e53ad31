//! Geometry records exchanged between the resolver and the diff engine

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in absolute page/screen coordinates
///
/// `x1 >= x0` and `y1 >= y0` are expected from well-formed input but not
/// enforced. A zero-area rectangle is a valid collapsed region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True when the rectangle covers no area
    pub fn is_collapsed(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}][{},{}]", self.x0, self.y0, self.x1, self.y1)
    }
}

/// Page scroll offset at snapshot time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollPos {
    pub x: u64,
    pub y: u64,
}

/// Viewport dimensions reported by a driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// Bounding box as reported by a live backend (`getBoundingClientRect` shape)
///
/// Some backends leave `width`/`height` unset or zero; see
/// [`crate::bounds::live_rect`] for how those are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Page-level metadata gathered before element geometry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub scroll_pos: ScrollPos,
    pub screen_width: u32,
    pub screen_height: u32,
}

/// Backend-agnostic geometry record feeding a screenshot comparison
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub title: String,
    pub scroll_pos: ScrollPos,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Absent when no target element was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem_bounding: Option<Rect>,
    /// Literal rectangles first, then resolved query rectangles, in input order
    #[serde(default)]
    pub exclude_rect: Vec<Rect>,
}

impl PageInfo {
    /// Start a record from page metadata, with no element or exclusions yet
    pub fn from_metadata(metadata: PageMetadata) -> Self {
        Self {
            title: metadata.title,
            scroll_pos: metadata.scroll_pos,
            screen_width: metadata.screen_width,
            screen_height: metadata.screen_height,
            elem_bounding: None,
            exclude_rect: Vec::new(),
        }
    }
}
