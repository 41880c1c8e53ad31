//! Geometry resolution against a static UI-tree snapshot backend
//!
//! Native-app automation cannot execute scripts, so everything is read from
//! the XML UI tree the driver dumps. Each lookup fetches and parses its own
//! snapshot, which lets exclusion queries run concurrently without sharing
//! parser state.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use glimpse_core::{PageMetadata, Rect};
use tracing::{debug, instrument, warn};

use crate::driver::SnapshotDriver;
use crate::error::{GlimpseError, Result};
use crate::tree::UiTree;

/// Snapshot backend adapter
#[derive(Clone)]
pub struct SnapshotAdapter {
    driver: Arc<dyn SnapshotDriver>,
}

impl SnapshotAdapter {
    pub fn new(driver: Arc<dyn SnapshotDriver>) -> Self {
        Self { driver }
    }

    /// Structural defaults, plus the viewport size when the driver can report it
    #[instrument(skip(self))]
    pub async fn page_metadata(&self) -> Result<PageMetadata> {
        let mut metadata = PageMetadata::default();
        if let Some(size) = self.driver.screen_size().await? {
            metadata.screen_width = size.width;
            metadata.screen_height = size.height;
        }
        Ok(metadata)
    }

    /// Rectangle of the first node matching `query`
    #[instrument(skip(self))]
    pub async fn element_rect(&self, query: &str) -> Result<Rect> {
        let source = self.driver.ui_tree_snapshot().await?;
        let nodes = UiTree::parse(&source)?.query(query)?;

        let first = nodes
            .first()
            .ok_or_else(|| GlimpseError::ElementNotFound(query.to_string()))?;

        first.rect()?.ok_or_else(|| {
            GlimpseError::MalformedBounds(format!(
                "node <{}> matched by {} has no bounds attributes",
                first.tag, query
            ))
        })
    }

    /// Rectangles of every node matching each query, flattened in query then match order
    ///
    /// Nodes whose bounds cannot be read are skipped.
    #[instrument(skip(self, queries), fields(count = queries.len()))]
    pub async fn query_rects(&self, queries: &[String]) -> Result<Vec<Rect>> {
        let per_query = try_join_all(queries.iter().map(|query| async move {
            let source = self.driver.ui_tree_snapshot().await?;
            rects_in(&source, query)
        }))
        .await?;

        Ok(per_query.into_iter().flatten().collect())
    }
}

fn rects_in(source: &str, query: &str) -> Result<Vec<Rect>> {
    let nodes = UiTree::parse(source)?.query(query)?;

    let rects: Vec<Rect> = nodes
        .iter()
        .filter_map(|node| match node.rect() {
            Ok(Some(rect)) => Some(rect),
            Ok(None) => {
                warn!("Skipping <{}> matched by {}: no bounds attributes", node.tag, query);
                None
            }
            Err(e) => {
                warn!("Skipping <{}> matched by {}: {}", node.tag, query, e);
                None
            }
        })
        .collect();

    debug!("Exclusion query {} resolved {} rects", query, rects.len());
    Ok(rects)
}

/// Snapshot driver reading the UI tree from a dump file on every fetch
#[derive(Debug, Clone)]
pub struct FileSnapshotDriver {
    path: PathBuf,
}

impl FileSnapshotDriver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotDriver for FileSnapshotDriver {
    async fn ui_tree_snapshot(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GlimpseError::DriverFailure(format!(
                "Failed to read UI tree dump {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSnapshotDriver;
    use glimpse_core::ScreenSize;

    const DUMP: &str = r#"<hierarchy rotation="0">
  <node class="android.widget.FrameLayout" bounds="[0,0][1080,1920]">
    <node resource-id="title" bounds="[10,20][110,220]"/>
    <node resource-id="banner" bounds="[0,1700][1080,1920]"/>
    <node resource-id="banner" text="no geometry"/>
    <node resource-id="banner" bounds="[0,0][oops]"/>
    <node resource-id="banner" x="5" y="6" width="40" height="50"/>
    <node resource-id="blank"/>
  </node>
</hierarchy>"#;

    fn adapter(driver: MockSnapshotDriver) -> SnapshotAdapter {
        SnapshotAdapter::new(Arc::new(driver))
    }

    #[tokio::test]
    async fn test_page_metadata_defaults() {
        let metadata = adapter(MockSnapshotDriver::new(DUMP)).page_metadata().await.unwrap();
        assert_eq!(metadata, PageMetadata::default());
    }

    #[tokio::test]
    async fn test_page_metadata_from_screen_size() {
        let driver = MockSnapshotDriver::new(DUMP).with_screen_size(1080, 1920);
        let metadata = adapter(driver).page_metadata().await.unwrap();
        assert_eq!(metadata.screen_width, 1080);
        assert_eq!(metadata.screen_height, 1920);
        assert_eq!(metadata.title, "");
    }

    #[tokio::test]
    async fn test_element_rect() {
        let rect = adapter(MockSnapshotDriver::new(DUMP))
            .element_rect("//node[@resource-id='title']")
            .await
            .unwrap();
        assert_eq!(rect, Rect::new(10.0, 20.0, 110.0, 220.0));
    }

    #[tokio::test]
    async fn test_element_rect_not_found() {
        let err = adapter(MockSnapshotDriver::new(DUMP))
            .element_rect("//node[@resource-id='missing']")
            .await
            .unwrap_err();
        assert!(matches!(err, GlimpseError::ElementNotFound(_)));
    }

    #[tokio::test]
    async fn test_element_rect_without_bounds() {
        let err = adapter(MockSnapshotDriver::new(DUMP))
            .element_rect("//node[@resource-id='blank']")
            .await
            .unwrap_err();
        assert!(matches!(err, GlimpseError::MalformedBounds(_)));
    }

    #[tokio::test]
    async fn test_query_rects_skips_unreadable_nodes() {
        let driver = MockSnapshotDriver::new(DUMP);
        let adapter = adapter(driver.clone());

        let rects = adapter
            .query_rects(&[
                "//node[@resource-id='banner']".to_string(),
                "//node[@resource-id='missing']".to_string(),
                "//node[@resource-id='title']".to_string(),
            ])
            .await
            .unwrap();

        assert_eq!(
            rects,
            vec![
                Rect::new(0.0, 1700.0, 1080.0, 1920.0),
                Rect::new(5.0, 6.0, 45.0, 56.0),
                Rect::new(10.0, 20.0, 110.0, 220.0),
            ]
        );
        assert_eq!(driver.fetches(), 3);
    }

    #[tokio::test]
    async fn test_query_rects_snapshot_failure_propagates() {
        let driver = MockSnapshotDriver::new(DUMP).failing("device disconnected");
        let err = adapter(driver)
            .query_rects(&["//node".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, GlimpseError::DriverFailure(_)));
    }

    #[tokio::test]
    async fn test_file_snapshot_driver() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("window_dump.xml");
        std::fs::write(&path, DUMP).unwrap();

        let driver = FileSnapshotDriver::new(&path);
        assert_eq!(driver.ui_tree_snapshot().await.unwrap(), DUMP);
        assert_eq!(driver.screen_size().await.unwrap(), None::<ScreenSize>);

        let missing = FileSnapshotDriver::new(dir.path().join("missing.xml"));
        assert!(matches!(
            missing.ui_tree_snapshot().await,
            Err(GlimpseError::DriverFailure(_))
        ));
    }
}
