//! Decoding of backend-specific bounds encodings into [`Rect`]
//!
//! Live backends report a `getBoundingClientRect`-style box. UI-tree
//! snapshots describe a node's rectangle either with one combined
//! `bounds="[x0,y0][x1,y1]"` attribute or with separate `x`, `y`, `width`
//! and `height` attributes.

use std::collections::BTreeMap;

use crate::{BoundingBox, GlimpseError, Rect, Result};

/// Rectangle of a live-backend bounding box
///
/// Only the edges are read, so boxes whose backend left `width`/`height`
/// zero or unset still yield their full extent.
pub fn live_rect(bbox: &BoundingBox) -> Rect {
    Rect {
        x0: bbox.left,
        y0: bbox.top,
        x1: bbox.right,
        y1: bbox.bottom,
    }
}

/// Parse a combined `[x0,y0][x1,y1]` bounds attribute
pub fn parse_bounds_attr(value: &str) -> Result<Rect> {
    let flattened = value.replace("][", ",").replace(['[', ']'], "");
    let coords = flattened
        .split(',')
        .map(|token| parse_coord(token, value))
        .collect::<Result<Vec<_>>>()?;

    match coords.as_slice() {
        &[x0, y0, x1, y1] => Ok(Rect { x0, y0, x1, y1 }),
        _ => Err(GlimpseError::MalformedBounds(format!(
            "expected 4 coordinates in '{}', found {}",
            value,
            coords.len()
        ))),
    }
}

/// Rectangle of a UI-tree node, read from its attributes
///
/// The combined `bounds` attribute wins when present. Otherwise all four of
/// `x`, `y`, `width` and `height` must be present; a partial set yields `None`.
pub fn snapshot_rect(attributes: &BTreeMap<String, String>) -> Result<Option<Rect>> {
    if let Some(bounds) = attributes.get("bounds") {
        return parse_bounds_attr(bounds).map(Some);
    }

    let (Some(x), Some(y), Some(width), Some(height)) = (
        attributes.get("x"),
        attributes.get("y"),
        attributes.get("width"),
        attributes.get("height"),
    ) else {
        return Ok(None);
    };

    let x = parse_coord(x, x)?;
    let y = parse_coord(y, y)?;
    let width = parse_coord(width, width)?;
    let height = parse_coord(height, height)?;

    Ok(Some(Rect {
        x0: x,
        y0: y,
        x1: x + width,
        y1: y + height,
    }))
}

fn parse_coord(token: &str, source: &str) -> Result<f64> {
    token
        .trim()
        .parse::<i64>()
        .map(|v| v as f64)
        .map_err(|_| {
            GlimpseError::MalformedBounds(format!("non-numeric coordinate '{}' in '{}'", token, source))
        })
}
