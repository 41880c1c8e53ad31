//! UI-tree snapshot parsing and XPath querying

use std::collections::BTreeMap;

use glimpse_core::bounds::snapshot_rect;
use glimpse_core::Rect;
use sxd_document::{parser, Package};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};
use tracing::debug;

use crate::error::{GlimpseError, Result};

/// One element of a UI-tree snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiNode {
    /// Element tag, e.g. `node` or `XCUIElementTypeButton`
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl UiNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Rectangle described by this node's bounds attributes, if any
    pub fn rect(&self) -> Result<Option<Rect>> {
        snapshot_rect(&self.attributes)
    }
}

/// Parsed UI-tree snapshot
///
/// Holds its own document storage, so each concurrent query should parse its
/// own instance rather than share one.
pub struct UiTree {
    package: Package,
}

impl UiTree {
    /// Parse an XML UI-tree dump
    pub fn parse(source: &str) -> Result<Self> {
        let package = parser::parse(source).map_err(|e| {
            GlimpseError::DriverFailure(format!("Failed to parse UI tree snapshot: {:?}", e))
        })?;
        Ok(Self { package })
    }

    /// Evaluate an XPath query and return matching elements in document order
    pub fn query(&self, query: &str) -> Result<Vec<UiNode>> {
        let document = self.package.as_document();

        let xpath = Factory::new()
            .build(query)
            .map_err(|e| GlimpseError::InvalidQuery(format!("{}: {}", query, e)))?
            .ok_or_else(|| GlimpseError::InvalidQuery(format!("{}: empty expression", query)))?;

        let context = Context::new();
        let value = xpath
            .evaluate(&context, document.root())
            .map_err(|e| GlimpseError::InvalidQuery(format!("{}: {}", query, e)))?;

        let Value::Nodeset(nodeset) = value else {
            return Err(GlimpseError::InvalidQuery(format!(
                "{}: expression does not select nodes",
                query
            )));
        };

        let nodes: Vec<UiNode> = nodeset
            .document_order()
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(UiNode {
                    tag: element.name().local_part().to_string(),
                    attributes: element
                        .attributes()
                        .into_iter()
                        .map(|attr| (attr.name().local_part().to_string(), attr.value().to_string()))
                        .collect(),
                }),
                _ => None,
            })
            .collect();

        debug!("Query {} matched {} nodes", query, nodes.len());
        Ok(nodes)
    }
}

/// Parse `source` and run one query against it
pub fn query_tree(source: &str, query: &str) -> Result<Vec<UiNode>> {
    UiTree::parse(source)?.query(query)
}
