//! Exclusion normalization
//!
//! Callers describe regions to mask with a loosely shaped argument: nothing,
//! one item, or a list of items, where each item is either a selector/query
//! string or a `{x0, y0, x1, y1}` rectangle. This module classifies those
//! items into an explicit [`ExclusionSpec`] and splits them into named queries
//! and literal rectangles.

use serde_json::Value;
use tracing::{debug, warn};

use crate::Rect;

/// One classified exclusion item
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionSpec {
    /// Selector or UI-tree query resolved against the backend
    NamedQuery(String),
    /// Coordinates masked as-is
    LiteralRect(Rect),
}

impl ExclusionSpec {
    /// Classify a raw exclusion item
    ///
    /// An object whose `x0`, `y0`, `x1` and `y1` are all numbers is a literal
    /// rectangle, a string is a named query, and anything else is `None`.
    pub fn classify(item: &Value) -> Option<Self> {
        match item {
            Value::String(query) => Some(Self::NamedQuery(query.clone())),
            Value::Object(fields) => {
                let coord = |name: &str| fields.get(name).and_then(Value::as_f64);
                match (coord("x0"), coord("y0"), coord("x1"), coord("y1")) {
                    (Some(x0), Some(y0), Some(x1), Some(y1)) => {
                        Some(Self::LiteralRect(Rect { x0, y0, x1, y1 }))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl From<Rect> for ExclusionSpec {
    fn from(rect: Rect) -> Self {
        Self::LiteralRect(rect)
    }
}

impl From<&str> for ExclusionSpec {
    fn from(query: &str) -> Self {
        Self::NamedQuery(query.to_string())
    }
}

impl From<ExclusionSpec> for Value {
    fn from(spec: ExclusionSpec) -> Self {
        match spec {
            ExclusionSpec::NamedQuery(query) => Value::String(query),
            ExclusionSpec::LiteralRect(rect) => serde_json::json!({
                "x0": rect.x0,
                "y0": rect.y0,
                "x1": rect.x1,
                "y1": rect.y1,
            }),
        }
    }
}

/// Exclusion argument split by kind, each list in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exclusions {
    pub queries: Vec<String>,
    pub literal_rects: Vec<Rect>,
}

impl Exclusions {
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty() && self.literal_rects.is_empty()
    }
}

impl FromIterator<ExclusionSpec> for Exclusions {
    fn from_iter<I: IntoIterator<Item = ExclusionSpec>>(iter: I) -> Self {
        let mut exclusions = Exclusions::default();
        for spec in iter {
            match spec {
                ExclusionSpec::NamedQuery(query) => exclusions.queries.push(query),
                ExclusionSpec::LiteralRect(rect) => exclusions.literal_rects.push(rect),
            }
        }
        exclusions
    }
}

/// Split a raw exclusion argument into named queries and literal rectangles
///
/// `None` and `null` produce nothing. A single non-array item behaves like a
/// one-element array. Items of any other shape are dropped.
pub fn normalize_exclusions(raw: Option<&Value>) -> Exclusions {
    let items: &[Value] = match raw {
        None | Some(Value::Null) => return Exclusions::default(),
        Some(Value::Array(items)) => items,
        Some(single) => std::slice::from_ref(single),
    };

    let exclusions: Exclusions = items
        .iter()
        .filter_map(|item| {
            let spec = ExclusionSpec::classify(item);
            if spec.is_none() {
                warn!("Dropping unrecognized exclusion item: {}", item);
            }
            spec
        })
        .collect();

    debug!(
        "Normalized exclusions: {} queries, {} literal rects",
        exclusions.queries.len(),
        exclusions.literal_rects.len()
    );

    exclusions
}
