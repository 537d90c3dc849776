//! Headless Chromium backend
//!
//! Drives a local Chromium over the DevTools protocol via chromiumoxide.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::{Browser, BrowserError, BrowserPage, ElementRef};

/// Chromium launch and wait settings
#[derive(Debug, Clone)]
pub struct ChromiumConfig {
    /// Run without a visible window
    pub headless: bool,
    /// Override the browser user agent
    pub user_agent: Option<String>,
    /// Settle time after navigation before the page counts as idle
    pub idle_settle: Duration,
    /// Poll interval while waiting for a selector
    pub poll_interval: Duration,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            idle_settle: Duration::from_millis(750),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// A running Chromium instance
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    handler: JoinHandle<()>,
    config: ChromiumConfig,
}

impl ChromiumBrowser {
    pub async fn launch(config: ChromiumConfig) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.arg(format!("--user-agent={user_agent}"));
        }
        let browser_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = CdpBrowser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler stopped");
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            config,
        })
    }

    /// Shut the browser down and wait for the process to exit
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Browser close error");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "Browser wait error");
        }
        self.handler.abort();
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;

        Ok(Box::new(ChromiumPage {
            page: Some(page),
            elements: Vec::new(),
            config: self.config.clone(),
        }))
    }
}

/// One Chromium tab; element handles index into `elements`
pub struct ChromiumPage {
    page: Option<Page>,
    elements: Vec<Element>,
    config: ChromiumConfig,
}

impl ChromiumPage {
    fn page(&self) -> Result<&Page, BrowserError> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::Protocol("page is closed".to_string()))
    }

    fn element(&self, handle: ElementRef) -> Result<&Element, BrowserError> {
        self.elements
            .get(handle.index())
            .ok_or(BrowserError::StaleElement(handle.index()))
    }

    fn register(&mut self, element: Element) -> ElementRef {
        self.elements.push(element);
        ElementRef::new(self.elements.len() - 1)
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.elements.clear();
        self.page()?
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError> {
        self.page()?
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        sleep(self.config.idle_settle).await;
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            let found = self
                .page()?
                .find_elements(selector)
                .await
                .map(|elements| !elements.is_empty())
                .unwrap_or(false);
            if found {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            sleep(self.config.poll_interval).await;
        }
    }

    async fn query_selector_all(
        &mut self,
        selector: &str,
    ) -> Result<Vec<ElementRef>, BrowserError> {
        let elements = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::InvalidSelector(format!("{selector}: {e}")))?;
        Ok(elements.into_iter().map(|e| self.register(e)).collect())
    }

    async fn query_within(
        &mut self,
        parent: ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>, BrowserError> {
        let children = self
            .element(parent)?
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::InvalidSelector(format!("{selector}: {e}")))?;
        Ok(children.into_iter().next().map(|e| self.register(e)))
    }

    async fn attribute(
        &mut self,
        element: ElementRef,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        self.element(element)?
            .attribute(name)
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))
    }

    async fn text_content(&mut self, element: ElementRef) -> Result<Option<String>, BrowserError> {
        self.element(element)?
            .inner_text()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))
    }

    async fn click(&mut self, element: ElementRef) -> Result<(), BrowserError> {
        self.element(element)?
            .click()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let result = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.elements.clear();
        if let Some(page) = self.page.take() {
            page.close()
                .await
                .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        }
        Ok(())
    }
}
