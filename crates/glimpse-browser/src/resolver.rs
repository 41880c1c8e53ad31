//! Geometry resolver: assembles a [`PageInfo`] through the active backend

use glimpse_core::{normalize_exclusions, BackendMode, PageInfo, PageMetadata, Rect};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::live::LiveAdapter;
use crate::snapshot::SnapshotAdapter;

/// Backend the resolution runs against, chosen once per call
#[derive(Clone)]
pub enum BackendAdapter {
    Live(LiveAdapter),
    Snapshot(SnapshotAdapter),
}

impl BackendAdapter {
    pub fn mode(&self) -> BackendMode {
        match self {
            Self::Live(_) => BackendMode::Live,
            Self::Snapshot(_) => BackendMode::Snapshot,
        }
    }

    async fn page_metadata(&self) -> Result<PageMetadata> {
        match self {
            Self::Live(adapter) => adapter.page_metadata().await,
            Self::Snapshot(adapter) => adapter.page_metadata().await,
        }
    }

    async fn element_rect(&self, target: &str) -> Result<Rect> {
        match self {
            Self::Live(adapter) => adapter.element_rect(target).await,
            Self::Snapshot(adapter) => adapter.element_rect(target).await,
        }
    }

    async fn query_rects(&self, queries: &[String]) -> Result<Vec<Rect>> {
        match self {
            Self::Live(adapter) => adapter.query_rects(queries).await,
            Self::Snapshot(adapter) => adapter.query_rects(queries).await,
        }
    }
}

impl From<LiveAdapter> for BackendAdapter {
    fn from(adapter: LiveAdapter) -> Self {
        Self::Live(adapter)
    }
}

impl From<SnapshotAdapter> for BackendAdapter {
    fn from(adapter: SnapshotAdapter) -> Self {
        Self::Snapshot(adapter)
    }
}

/// Inputs of one resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Selector (live) or UI-tree query (snapshot) of the element under test
    pub target: Option<String>,
    /// Raw exclusion argument: a query string, an `{x0, y0, x1, y1}` object, or an array of those
    pub exclude: Option<Value>,
}

impl ResolveRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn exclude(mut self, exclude: impl Into<Value>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }
}

/// Resolve page metadata, the target element's rectangle and all exclusion
/// rectangles into one [`PageInfo`]
///
/// Literal exclusion rectangles come first, followed by the rectangles of
/// each query in input order. Any failure aborts the whole resolution.
#[instrument(skip(adapter, request), fields(mode = %adapter.mode()))]
pub async fn resolve_page_info(adapter: &BackendAdapter, request: &ResolveRequest) -> Result<PageInfo> {
    let metadata = adapter.page_metadata().await?;
    let mut info = PageInfo::from_metadata(metadata);

    if let Some(target) = &request.target {
        let rect = adapter.element_rect(target).await?;
        debug!("Target {} at {}", target, rect);
        info.elem_bounding = Some(rect);
    }

    let exclusions = normalize_exclusions(request.exclude.as_ref());
    info.exclude_rect = exclusions.literal_rects;

    if !exclusions.queries.is_empty() {
        let resolved = adapter.query_rects(&exclusions.queries).await?;
        info.exclude_rect.extend(resolved);
    }

    info!(
        "Resolved page info: target={}, {} exclusion rects",
        info.elem_bounding.is_some(),
        info.exclude_rect.len()
    );

    Ok(info)
}
