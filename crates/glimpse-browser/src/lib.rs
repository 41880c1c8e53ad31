//! Page geometry resolution for visual regression testing
//!
//! Before a screenshot is compared with its baseline, the comparison needs the
//! page's scroll offset and viewport size, the rectangle of the element under
//! test, and the rectangles to mask out. This crate resolves all of that into a
//! single [`PageInfo`] against one of two automation backends:
//!
//! - **Live**: a script-executing web backend ([`LiveDriver`]), such as
//!   headless Chrome through [`BrowserSession`]
//! - **Snapshot**: a backend that only offers a static XML UI-tree dump
//!   ([`SnapshotDriver`]), typical of native mobile automation
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use glimpse_browser::{resolve_page_info, BackendAdapter, BrowserSession, LiveAdapter, ResolveRequest};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = BrowserSession::launch().await?;
//!     session.navigate("https://example.com").await?;
//!
//!     let adapter = BackendAdapter::Live(LiveAdapter::new(Arc::new(session)));
//!     let request = ResolveRequest::new()
//!         .target("main")
//!         .exclude(json!([".ad-banner", {"x0": 0, "y0": 0, "x1": 1920, "y1": 40}]));
//!
//!     let info = resolve_page_info(&adapter, &request).await?;
//!     println!("{}", serde_json::to_string_pretty(&info)?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`driver`]: capability traits the resolver needs from an automation driver
//! - [`live`]: live backend adapter and the page metadata script
//! - [`snapshot`]: snapshot backend adapter and a file-backed snapshot driver
//! - [`tree`]: UI-tree parsing and XPath querying
//! - [`resolver`]: backend selection and [`PageInfo`] assembly
//! - [`browser`]: headless Chrome [`LiveDriver`]
//! - [`mock`]: in-memory drivers for tests

pub mod browser;
pub mod driver;
pub mod error;
pub mod live;
pub mod mock;
pub mod resolver;
pub mod snapshot;
pub mod tree;

// Re-export commonly used types
pub use browser::BrowserSession;
pub use driver::{ElementHandle, LiveDriver, SnapshotDriver};
pub use error::{GlimpseError, Result};
pub use glimpse_core::{PageInfo, Rect, ScrollPos};
pub use live::LiveAdapter;
pub use resolver::{resolve_page_info, BackendAdapter, ResolveRequest};
pub use snapshot::{FileSnapshotDriver, SnapshotAdapter};
pub use tree::{query_tree, UiNode, UiTree};
