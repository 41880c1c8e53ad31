//! Geometry resolution against a live, script-executing web backend

use std::sync::Arc;

use futures::future::try_join_all;
use glimpse_core::bounds::live_rect;
use glimpse_core::{PageMetadata, Rect, ScrollPos};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::driver::LiveDriver;
use crate::error::{GlimpseError, Result};

/// Page-context expression producing title, scroll offset and viewport size
///
/// Scroll offset reads `window.pageXOffset/pageYOffset`, then the body's
/// scroll offsets, then the document element's. Viewport dimensions take the
/// larger of the document's client size and the window's inner size.
pub const PAGE_METADATA_SCRIPT: &str = r#"(function () {
    var x = 0, y = 0;
    if (typeof window.pageYOffset === 'number') {
        y = window.pageYOffset;
        x = window.pageXOffset;
    } else if (document.body && (document.body.scrollLeft || document.body.scrollTop)) {
        y = document.body.scrollTop;
        x = document.body.scrollLeft;
    } else if (document.documentElement && (document.documentElement.scrollLeft || document.documentElement.scrollTop)) {
        y = document.documentElement.scrollTop;
        x = document.documentElement.scrollLeft;
    }
    return {
        title: document.title,
        scrollPos: { x: x, y: y },
        screenWidth: Math.max(document.documentElement.clientWidth, window.innerWidth || 0),
        screenHeight: Math.max(document.documentElement.clientHeight, window.innerHeight || 0)
    };
})()"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptPageMetadata {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    scroll_pos: Option<ScriptScrollPos>,
    #[serde(default)]
    screen_width: Option<f64>,
    #[serde(default)]
    screen_height: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ScriptScrollPos {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
}

fn to_u64(value: Option<f64>) -> u64 {
    value.filter(|v| v.is_finite()).map_or(0, |v| v.max(0.0).round() as u64)
}

impl From<ScriptPageMetadata> for PageMetadata {
    fn from(raw: ScriptPageMetadata) -> Self {
        let scroll_pos = raw
            .scroll_pos
            .map(|pos| ScrollPos {
                x: to_u64(pos.x),
                y: to_u64(pos.y),
            })
            .unwrap_or_default();

        Self {
            title: raw.title.unwrap_or_default(),
            scroll_pos,
            screen_width: to_u64(raw.screen_width).min(u32::MAX as u64) as u32,
            screen_height: to_u64(raw.screen_height).min(u32::MAX as u64) as u32,
        }
    }
}

/// Live backend adapter
#[derive(Clone)]
pub struct LiveAdapter {
    driver: Arc<dyn LiveDriver>,
}

impl LiveAdapter {
    pub fn new(driver: Arc<dyn LiveDriver>) -> Self {
        Self { driver }
    }

    /// Title, scroll offset and viewport size of the current page
    #[instrument(skip(self))]
    pub async fn page_metadata(&self) -> Result<PageMetadata> {
        let value = self.driver.execute_in_page(PAGE_METADATA_SCRIPT).await?;
        let raw: ScriptPageMetadata = serde_json::from_value(value).map_err(|e| {
            GlimpseError::DriverFailure(format!("Unexpected page metadata reply: {}", e))
        })?;
        let metadata = PageMetadata::from(raw);

        debug!(
            "Page '{}' scrolled to ({}, {}), viewport {}x{}",
            metadata.title,
            metadata.scroll_pos.x,
            metadata.scroll_pos.y,
            metadata.screen_width,
            metadata.screen_height
        );

        Ok(metadata)
    }

    /// Rectangle of the first element matching `selector`
    #[instrument(skip(self))]
    pub async fn element_rect(&self, selector: &str) -> Result<Rect> {
        let handles = self.driver.query_elements(selector).await?;
        let first = handles
            .first()
            .ok_or_else(|| GlimpseError::ElementNotFound(selector.to_string()))?;

        let rect = live_rect(&self.driver.bounding_box(first).await?);
        debug!("Element {} is {}x{}", selector, rect.width(), rect.height());
        Ok(rect)
    }

    /// Rectangles of every element matching each query, flattened in query then match order
    ///
    /// Queries run concurrently. A query that matches nothing contributes no
    /// rectangles; any other driver failure aborts.
    #[instrument(skip(self, queries), fields(count = queries.len()))]
    pub async fn query_rects(&self, queries: &[String]) -> Result<Vec<Rect>> {
        let per_query = try_join_all(queries.iter().map(|query| self.rects_for(query))).await?;
        Ok(per_query.into_iter().flatten().collect())
    }

    async fn rects_for(&self, query: &str) -> Result<Vec<Rect>> {
        let handles = match self.driver.query_elements(query).await {
            Ok(handles) => handles,
            Err(e) if e.is_no_such_element() => {
                debug!("Exclusion query {} matched nothing", query);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut rects = Vec::with_capacity(handles.len());
        for handle in &handles {
            match self.driver.bounding_box(handle).await {
                Ok(bbox) => rects.push(live_rect(&bbox)),
                Err(e) if e.is_no_such_element() => {
                    debug!("Match {} of {} vanished before measuring", handle.index(), query);
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Exclusion query {} resolved {} rects", query, rects.len());
        Ok(rects)
    }
}
