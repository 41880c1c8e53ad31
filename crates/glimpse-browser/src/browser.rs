//! Headless Chrome live driver using Chrome DevTools Protocol

use crate::driver::{ElementHandle, LiveDriver};
use crate::error::{GlimpseError, Result};
use async_trait::async_trait;
use glimpse_core::{BoundingBox, BrowserSettings};
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::Deserialize;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Resolves `__SELECTOR__` to an array of elements. Selectors starting with
/// `/` or `(` are XPath expressions, everything else goes to `querySelectorAll`.
const ELEMENTS_PRELUDE: &str = r#"
    var sel = __SELECTOR__;
    var all = function (sel) {
        if (sel.charAt(0) === '/' || sel.charAt(0) === '(') {
            var snap = document.evaluate(sel, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
            var out = [];
            for (var i = 0; i < snap.snapshotLength; i++) { out.push(snap.snapshotItem(i)); }
            return out;
        }
        return Array.prototype.slice.call(document.querySelectorAll(sel));
    };
"#;

const COUNT_SCRIPT: &str = r#"(function () {
    __PRELUDE__
    try {
        return JSON.stringify({ count: all(sel).length });
    } catch (e) {
        return JSON.stringify({ error: String(e) });
    }
})()"#;

const BOUNDING_BOX_SCRIPT: &str = r#"(function () {
    __PRELUDE__
    try {
        var el = all(sel)[__INDEX__];
        if (!el) { return JSON.stringify({ found: false }); }
        var r = el.getBoundingClientRect();
        return JSON.stringify({ found: true, rect: {
            width: r.width ? r.width : r.right - r.left,
            height: r.height ? r.height : r.bottom - r.top,
            top: r.top, right: r.right, bottom: r.bottom, left: r.left
        } });
    } catch (e) {
        return JSON.stringify({ error: String(e) });
    }
})()"#;

#[derive(Debug, Deserialize)]
struct CountReply {
    count: Option<usize>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoundingBoxReply {
    #[serde(default)]
    found: bool,
    rect: Option<BoundingBox>,
    error: Option<String>,
}

fn element_script(template: &str, selector: &str, index: usize) -> Result<String> {
    let literal = serde_json::to_string(selector)?;
    Ok(template
        .replace("__PRELUDE__", ELEMENTS_PRELUDE)
        .replace("__SELECTOR__", &literal)
        .replace("__INDEX__", &index.to_string()))
}

/// Active browser session with Chrome DevTools Protocol
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// Current active tab
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance with default settings
    pub async fn launch() -> Result<Self> {
        Self::launch_with_settings(&BrowserSettings::default()).await
    }

    /// Launch browser with custom settings
    pub async fn launch_with_settings(settings: &BrowserSettings) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            settings.headless, settings.window_width, settings.window_height
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .window_size(Some((settings.window_width, settings.window_height)))
            .build()
            .map_err(|e| GlimpseError::DriverFailure(format!("Failed to launch browser: {}", e)))?;

        let user_agent_arg: Option<String> = settings.user_agent.as_ref().map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| GlimpseError::DriverFailure(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| GlimpseError::DriverFailure(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(settings.timeout_seconds));

        info!("Browser launched successfully");

        Ok(Self { browser, tab })
    }

    /// Connect to an existing browser instance
    ///
    /// # Arguments
    /// * `port` - Chrome DevTools Protocol port (typically 9222)
    pub async fn connect(port: u16) -> Result<Self> {
        info!("Connecting to existing browser on port {}", port);

        let browser = Browser::connect(format!("http://127.0.0.1:{}", port))
            .map_err(|e| GlimpseError::DriverFailure(format!("Failed to connect to browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| GlimpseError::DriverFailure(format!("Failed to create tab: {}", e)))?;

        info!("Connected to browser successfully");

        Ok(Self { browser, tab })
    }

    /// Navigate to a URL and wait for it to load
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| GlimpseError::DriverFailure(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| GlimpseError::DriverFailure(format!("Navigation timeout for {}: {}", url, e)))?;

        info!("Successfully navigated to {}", url);
        Ok(())
    }

    /// Evaluate an expression whose result is a JSON string, and parse it
    async fn evaluate_json(&self, expression: &str) -> Result<serde_json::Value> {
        let result = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| GlimpseError::DriverFailure(format!("JavaScript evaluation failed: {}", e)))?;

        match result.value {
            Some(serde_json::Value::String(json)) => Ok(serde_json::from_str(&json)?),
            _ => Ok(serde_json::Value::Null),
        }
    }
}

#[async_trait]
impl LiveDriver for BrowserSession {
    async fn execute_in_page(&self, script: &str) -> Result<serde_json::Value> {
        debug!("Executing page script ({} bytes)", script.len());
        self.evaluate_json(&format!("JSON.stringify({})", script)).await
    }

    async fn query_elements(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let script = element_script(COUNT_SCRIPT, selector, 0)?;
        let reply: CountReply = serde_json::from_value(self.evaluate_json(&script).await?)?;

        if let Some(error) = reply.error {
            return Err(GlimpseError::DriverFailure(format!("Query {} failed: {}", selector, error)));
        }

        let count = reply.count.unwrap_or(0);
        debug!("Selector {} matched {} elements", selector, count);
        Ok((0..count).map(|i| ElementHandle::new(selector, i)).collect())
    }

    async fn bounding_box(&self, handle: &ElementHandle) -> Result<BoundingBox> {
        let script = element_script(BOUNDING_BOX_SCRIPT, handle.selector(), handle.index())?;
        let reply: BoundingBoxReply = serde_json::from_value(self.evaluate_json(&script).await?)?;

        if let Some(error) = reply.error {
            return Err(GlimpseError::DriverFailure(format!(
                "Measuring {} failed: {}",
                handle.selector(),
                error
            )));
        }

        match reply.rect {
            Some(rect) if reply.found => Ok(rect),
            _ => Err(GlimpseError::ElementNotFound(format!(
                "{} (match {})",
                handle.selector(),
                handle.index()
            ))),
        }
    }
}
