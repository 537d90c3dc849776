//! Scripted in-memory browser for crawl tests
//!
//! Pages are keyed by URL. Selectors match by exact string, so a fake page
//! declares which nodes each selector string returns. Navigations, clicks
//! and closed pages are recorded for assertions.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use scout_browser::{Browser, BrowserError, BrowserPage, ElementRef, ExtractFn};

#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    text: Option<String>,
    attrs: HashMap<String, String>,
    children: HashMap<String, Vec<FakeNode>>,
    click_fails: bool,
}

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, selector: &str, node: FakeNode) -> Self {
        self.children
            .entry(selector.to_string())
            .or_default()
            .push(node);
        self
    }

    pub fn failing_click(mut self) -> Self {
        self.click_fails = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    nodes: HashMap<String, Vec<FakeNode>>,
    evaluations: HashMap<&'static str, Value>,
    unreachable: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, selector: &str, node: FakeNode) -> Self {
        self.nodes
            .entry(selector.to_string())
            .or_default()
            .push(node);
        self
    }

    pub fn nodes(mut self, selector: &str, nodes: Vec<FakeNode>) -> Self {
        self.nodes
            .entry(selector.to_string())
            .or_default()
            .extend(nodes);
        self
    }

    /// Value returned when the extraction function `function` is evaluated
    pub fn evaluates(mut self, function: ExtractFn, value: Value) -> Self {
        self.evaluations.insert(function.name(), value);
        self
    }

    /// Navigating to this page fails
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }
}

#[derive(Debug, Default)]
struct Log {
    navigations: Vec<String>,
    clicks: usize,
    opened: usize,
    closed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    pages: Arc<HashMap<String, FakePage>>,
    log: Arc<Mutex<Log>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), page);
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log.lock().navigations.clone()
    }

    pub fn clicks(&self) -> usize {
        self.log.lock().clicks
    }

    /// Pages opened and not yet closed
    pub fn open_pages(&self) -> usize {
        let log = self.log.lock();
        log.opened - log.closed
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, BrowserError> {
        self.log.lock().opened += 1;
        Ok(Box::new(FakeTab {
            pages: self.pages.clone(),
            log: self.log.clone(),
            current: FakePage::default(),
            elements: Vec::new(),
            closed: false,
        }))
    }
}

struct FakeTab {
    pages: Arc<HashMap<String, FakePage>>,
    log: Arc<Mutex<Log>>,
    current: FakePage,
    elements: Vec<FakeNode>,
    closed: bool,
}

impl FakeTab {
    fn element(&self, handle: ElementRef) -> Result<&FakeNode, BrowserError> {
        self.elements
            .get(handle.index())
            .ok_or(BrowserError::StaleElement(handle.index()))
    }

    fn register(&mut self, node: FakeNode) -> ElementRef {
        self.elements.push(node);
        ElementRef::new(self.elements.len() - 1)
    }
}

#[async_trait]
impl BrowserPage for FakeTab {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.log.lock().navigations.push(url.to_string());
        self.elements.clear();
        self.current = self.pages.get(url).cloned().unwrap_or_default();
        if self.current.unreachable {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        Ok(())
    }

    async fn wait_for_network_idle(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        match self.current.nodes.get(selector) {
            Some(nodes) if !nodes.is_empty() => Ok(()),
            _ => Err(BrowserError::Timeout {
                selector: selector.to_string(),
                timeout,
            }),
        }
    }

    async fn query_selector_all(
        &mut self,
        selector: &str,
    ) -> Result<Vec<ElementRef>, BrowserError> {
        let nodes = self.current.nodes.get(selector).cloned().unwrap_or_default();
        Ok(nodes.into_iter().map(|n| self.register(n)).collect())
    }

    async fn query_within(
        &mut self,
        parent: ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>, BrowserError> {
        let child = self
            .element(parent)?
            .children
            .get(selector)
            .and_then(|nodes| nodes.first())
            .cloned();
        Ok(child.map(|n| self.register(n)))
    }

    async fn attribute(
        &mut self,
        element: ElementRef,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        Ok(self.element(element)?.attrs.get(name).cloned())
    }

    async fn text_content(&mut self, element: ElementRef) -> Result<Option<String>, BrowserError> {
        Ok(self.element(element)?.text.clone())
    }

    async fn click(&mut self, element: ElementRef) -> Result<(), BrowserError> {
        if self.element(element)?.click_fails {
            return Err(BrowserError::Protocol("element is not clickable".to_string()));
        }
        self.log.lock().clicks += 1;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, BrowserError> {
        let called = self
            .current
            .evaluations
            .iter()
            .find(|(name, _)| script.contains(&format!("return {name}();")));
        Ok(called.map(|(_, value)| value.clone()).unwrap_or(Value::Null))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if !self.closed {
            self.closed = true;
            self.log.lock().closed += 1;
        }
        Ok(())
    }
}
