//! Headless Chrome driver.

use std::ffi::OsStr;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde_json::Value;

use crate::browser::{BrowserSession, PostHandle, SessionFactory};
use crate::error::BrowserError;
use crate::models::BrowserConfig;

/// True when the element sits inside another element matching the selector.
const IS_NESTED_JS: &str = r#"function(selector) {
    if (!this.parentElement) return false;
    const outer = this.parentElement.closest(selector);
    return outer !== null && outer !== this;
}"#;

/// Clicks the first visible control whose text equals a label and whose
/// closest post is this element. Returns whether one was clicked.
const EXPAND_JS: &str = r#"function(selector, labels) {
    const wanted = labels.map(l => l.trim().toLowerCase());
    const candidates = this.querySelectorAll('div[role="button"], span[role="button"], a, button, span, div');
    for (const node of candidates) {
        if (node.closest(selector) !== this) continue;
        if (node.offsetParent === null) continue;
        const text = (node.innerText || '').trim().toLowerCase();
        if (wanted.includes(text)) {
            node.click();
            return true;
        }
    }
    return false;
}"#;

/// How often `document.readyState` is checked after navigation.
const LOAD_POLL: Duration = Duration::from_millis(250);
/// Quiet period after load for the feed's late requests.
const IDLE_SETTLE: Duration = Duration::from_millis(500);

/// Launches one Chrome process per session.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

impl SessionFactory for ChromeLauncher {
    type Session = ChromeSession;

    fn launch(&self) -> Result<ChromeSession, BrowserError> {
        let args: Vec<&OsStr> = self.config.launch_args.iter().map(OsStr::new).collect();
        let options = LaunchOptions::default_builder()
            .headless(self.config.headless)
            .sandbox(self.config.sandbox)
            .window_size(Some(self.config.window_size))
            .idle_browser_timeout(self.config.navigation_timeout() * 2)
            .args(args)
            .build()
            .map_err(|e| BrowserError::unexpected(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options).map_err(|e| classify("launch", e))?;
        let tab = browser.new_tab().map_err(|e| classify("open tab", e))?;
        tab.set_user_agent(&self.config.user_agent, None, None)
            .map_err(|e| classify("set user agent", e))?;
        tab.set_default_timeout(self.config.navigation_timeout());

        log::debug!("Launched Chrome (headless: {})", self.config.headless);
        Ok(ChromeSession {
            browser: Some(browser),
            tab,
        })
    }
}

/// A Chrome process with a single tab.
pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl BrowserSession for ChromeSession {
    type Post<'a> = ChromePost<'a>;

    fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let started = Instant::now();
        self.tab.set_default_timeout(timeout);
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| classify_wait(url, timeout, e))?;

        poll_until(url, timeout.saturating_sub(started.elapsed()), LOAD_POLL, || {
            let state = self
                .tab
                .evaluate("document.readyState", false)
                .map_err(|e| classify("load state", e))?;
            Ok(state.value.as_ref().and_then(Value::as_str) == Some("complete"))
        })?;
        std::thread::sleep(IDLE_SETTLE);
        Ok(())
    }

    fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| classify_wait(selector, timeout, e))?;
        Ok(())
    }

    fn scroll_to_fraction(&self, fraction: f64) -> Result<(), BrowserError> {
        let script = format!("window.scrollTo(0, document.body.scrollHeight * {fraction})");
        self.tab
            .evaluate(&script, false)
            .map_err(|e| classify("scroll", e))?;
        Ok(())
    }

    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn query_all(&self, selector: &str) -> Result<Vec<ChromePost<'_>>, BrowserError> {
        let elements = self
            .tab
            .find_elements(selector)
            .map_err(|e| classify("query posts", e))?;
        Ok(elements.into_iter().map(|element| ChromePost { element }).collect())
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };
        let closed = self.tab.close(true).map_err(|e| classify("close", e));
        // Dropping the browser kills the Chrome process.
        drop(browser);
        closed.map(|_| ())
    }
}

/// A post element on a live page.
pub struct ChromePost<'a> {
    element: Element<'a>,
}

impl ChromePost<'_> {
    fn call(&self, stage: &str, function: &str, args: Vec<Value>) -> Result<Value, BrowserError> {
        let result = self
            .element
            .call_js_fn(function, args, false)
            .map_err(|e| classify(stage, e))?;
        Ok(result.value.unwrap_or(Value::Null))
    }
}

impl PostHandle for ChromePost<'_> {
    fn is_nested(&self, post_selector: &str) -> Result<bool, BrowserError> {
        let value = self.call("nesting check", IS_NESTED_JS, vec![Value::from(post_selector)])?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn expand(&self, post_selector: &str, labels: &[String]) -> Result<bool, BrowserError> {
        let args = vec![Value::from(post_selector), Value::from(labels.to_vec())];
        let value = self.call("expand", EXPAND_JS, args)?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn inner_text(&self) -> Result<String, BrowserError> {
        self.element
            .get_inner_text()
            .map_err(|e| classify("read text", e))
    }
}

/// Check `ready` every `interval` until it holds, failing with a timeout once
/// `timeout` has passed.
fn poll_until<F>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut ready: F,
) -> Result<(), BrowserError>
where
    F: FnMut() -> Result<bool, BrowserError>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if ready()? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(BrowserError::timeout(what, timeout));
        }
        std::thread::sleep(interval);
    }
}

/// Map a driver error onto the retryable taxonomy.
fn classify(stage: &str, err: impl fmt::Display) -> BrowserError {
    let message = err.to_string();
    if looks_like_timeout(&message) {
        BrowserError::timeout(stage, Duration::ZERO)
    } else {
        BrowserError::automation(stage, message)
    }
}

fn classify_wait(what: &str, timeout: Duration, err: impl fmt::Display) -> BrowserError {
    let message = err.to_string();
    if looks_like_timeout(&message) {
        BrowserError::timeout(what, timeout)
    } else {
        BrowserError::automation(format!("waiting for {what}"), message)
    }
}

fn looks_like_timeout(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("timeout") || lower.contains("timed out") || lower.contains("never came")
}
