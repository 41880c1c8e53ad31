//! In-memory drivers for testing resolution without a browser or device

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glimpse_core::{BoundingBox, ScreenSize};

use crate::driver::{ElementHandle, LiveDriver, SnapshotDriver};
use crate::error::{GlimpseError, Result};

/// Failure a mock driver reports for a selector
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Reported as `ElementNotFound`
    NoSuchElement,
    /// Reported as `DriverFailure` with this message
    Driver(String),
}

impl MockFailure {
    fn to_error(&self, selector: &str) -> GlimpseError {
        match self {
            Self::NoSuchElement => GlimpseError::ElementNotFound(selector.to_string()),
            Self::Driver(message) => GlimpseError::DriverFailure(message.clone()),
        }
    }
}

/// Mock live driver with canned page metadata and element boxes
#[derive(Clone, Default)]
pub struct MockLiveDriver {
    page_metadata: serde_json::Value,
    elements: HashMap<String, Vec<BoundingBox>>,
    failures: HashMap<String, MockFailure>,
    delays: HashMap<String, Duration>,
    stale: HashSet<(String, usize)>,
    script_calls: Arc<AtomicUsize>,
    query_calls: Arc<AtomicUsize>,
}

impl MockLiveDriver {
    pub fn new() -> Self {
        Self {
            page_metadata: serde_json::json!({}),
            ..Self::default()
        }
    }

    /// Value returned by every script execution
    pub fn with_page_metadata(mut self, value: serde_json::Value) -> Self {
        self.page_metadata = value;
        self
    }

    /// Boxes of the elements `selector` matches, in document order
    pub fn with_elements(mut self, selector: &str, boxes: Vec<BoundingBox>) -> Self {
        self.elements.insert(selector.to_string(), boxes);
        self
    }

    pub fn with_failure(mut self, selector: &str, failure: MockFailure) -> Self {
        self.failures.insert(selector.to_string(), failure);
        self
    }

    /// Delay `query_elements` for `selector`, to make queries complete out of order
    pub fn with_delay(mut self, selector: &str, delay: Duration) -> Self {
        self.delays.insert(selector.to_string(), delay);
        self
    }

    /// Make match `index` of `selector` disappear between query and measurement
    pub fn with_stale_match(mut self, selector: &str, index: usize) -> Self {
        self.stale.insert((selector.to_string(), index));
        self
    }

    /// Number of `execute_in_page` calls so far (shared across clones)
    pub fn script_calls(&self) -> usize {
        self.script_calls.load(Ordering::SeqCst)
    }

    /// Number of `query_elements` calls so far (shared across clones)
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveDriver for MockLiveDriver {
    async fn execute_in_page(&self, _script: &str) -> Result<serde_json::Value> {
        self.script_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.page_metadata.clone())
    }

    async fn query_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(selector) {
            tokio::time::sleep(*delay).await;
        }

        if let Some(failure) = self.failures.get(selector) {
            return Err(failure.to_error(selector));
        }

        let count = self.elements.get(selector).map_or(0, Vec::len);
        Ok((0..count).map(|i| ElementHandle::new(selector, i)).collect())
    }

    async fn bounding_box(&self, handle: &ElementHandle) -> Result<BoundingBox> {
        if self
            .stale
            .contains(&(handle.selector().to_string(), handle.index()))
        {
            return Err(GlimpseError::ElementNotFound(handle.selector().to_string()));
        }

        self.elements
            .get(handle.selector())
            .and_then(|boxes| boxes.get(handle.index()))
            .copied()
            .ok_or_else(|| GlimpseError::ElementNotFound(handle.selector().to_string()))
    }
}

/// Mock snapshot driver serving a fixed UI-tree dump
#[derive(Clone, Default)]
pub struct MockSnapshotDriver {
    source: String,
    screen_size: Option<ScreenSize>,
    failure: Option<String>,
    fetch_delays: Vec<Duration>,
    fetches: Arc<AtomicUsize>,
}

impl MockSnapshotDriver {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_size = Some(ScreenSize { width, height });
        self
    }

    /// Delay the n-th snapshot fetch by `delays[n]`; later fetches are immediate
    pub fn with_fetch_delays(mut self, delays: Vec<Duration>) -> Self {
        self.fetch_delays = delays;
        self
    }

    /// Make every snapshot fetch fail with `DriverFailure`
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Number of snapshot fetches so far (shared across clones)
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotDriver for MockSnapshotDriver {
    async fn ui_tree_snapshot(&self) -> Result<String> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delays.get(n) {
            tokio::time::sleep(*delay).await;
        }

        match &self.failure {
            Some(message) => Err(GlimpseError::DriverFailure(message.clone())),
            None => Ok(self.source.clone()),
        }
    }

    async fn screen_size(&self) -> Result<Option<ScreenSize>> {
        Ok(self.screen_size)
    }
}
