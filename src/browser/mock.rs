//! Scripted browser double for unit tests.

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::browser::{AncestorWalk, BrowserSession, PostHandle, SessionFactory, has_ancestor_matching};
use crate::error::BrowserError;

type EventLog = Arc<Mutex<Vec<String>>>;

/// Hands out pre-scripted pages, one per launch, and records every call.
pub struct MockFactory {
    pages: Mutex<VecDeque<Result<MockPage, BrowserError>>>,
    events: EventLog,
}

impl MockFactory {
    pub fn new(pages: Vec<Result<MockPage, BrowserError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            events: EventLog::default(),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn launches(&self) -> usize {
        self.events().iter().filter(|e| *e == "launch").count()
    }
}

impl SessionFactory for MockFactory {
    type Session = MockSession;

    fn launch(&self) -> Result<MockSession, BrowserError> {
        self.events.lock().unwrap().push("launch".into());
        let page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BrowserError::unexpected("no scripted page left")))?;
        Ok(MockSession {
            page,
            events: Arc::clone(&self.events),
        })
    }
}

/// What one launched page does.
#[derive(Default)]
pub struct MockPage {
    posts: Vec<MockPost>,
    goto_error: Option<BrowserError>,
    wait_error: Option<BrowserError>,
    scroll_error: Option<BrowserError>,
    close_fails: bool,
}

impl MockPage {
    /// A page whose post elements carry these texts, none nested.
    pub fn with_posts(texts: &[&str]) -> Self {
        let mut page = Self::default();
        for text in texts {
            page = page.post(MockPost::new(*text));
        }
        page
    }

    pub fn post(mut self, post: MockPost) -> Self {
        self.posts.push(post);
        self
    }

    pub fn goto_fails(mut self, error: BrowserError) -> Self {
        self.goto_error = Some(error);
        self
    }

    pub fn wait_fails(mut self, error: BrowserError) -> Self {
        self.wait_error = Some(error);
        self
    }

    pub fn scroll_fails(mut self, error: BrowserError) -> Self {
        self.scroll_error = Some(error);
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.close_fails = true;
        self
    }
}

/// One post-role element on a scripted page.
pub struct MockPost {
    text: String,
    expanded_text: Option<String>,
    parent: Option<usize>,
    expanded: Cell<bool>,
    text_error: Option<BrowserError>,
    nested_error: Option<BrowserError>,
    expand_error: Option<BrowserError>,
}

impl MockPost {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expanded_text: None,
            parent: None,
            expanded: Cell::new(false),
            text_error: None,
            nested_error: None,
            expand_error: None,
        }
    }

    /// Text shown once the "see more" control is clicked.
    pub fn truncated(mut self, full_text: impl Into<String>) -> Self {
        self.expanded_text = Some(full_text.into());
        self
    }

    /// Nest this element inside the post at `index`.
    pub fn inside(mut self, index: usize) -> Self {
        self.parent = Some(index);
        self
    }

    pub fn unreadable(mut self, error: BrowserError) -> Self {
        self.text_error = Some(error);
        self
    }

    pub fn nesting_check_fails(mut self, error: BrowserError) -> Self {
        self.nested_error = Some(error);
        self
    }

    pub fn expand_fails(mut self, error: BrowserError) -> Self {
        self.expand_error = Some(error);
        self
    }
}

/// A launched scripted page.
pub struct MockSession {
    page: MockPage,
    events: EventLog,
}

impl MockSession {
    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl BrowserSession for MockSession {
    type Post<'a> = MockPostHandle<'a>;

    fn goto(&self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.record(format!("goto {url}"));
        self.page.goto_error.clone().map_or(Ok(()), Err)
    }

    fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.record(format!("wait {selector}"));
        self.page.wait_error.clone().map_or(Ok(()), Err)
    }

    fn scroll_to_fraction(&self, fraction: f64) -> Result<(), BrowserError> {
        self.record(format!("scroll {fraction}"));
        self.page.scroll_error.clone().map_or(Ok(()), Err)
    }

    fn pause(&self, duration: Duration) {
        self.record(format!("pause {}ms", duration.as_millis()));
    }

    fn query_all(&self, _selector: &str) -> Result<Vec<MockPostHandle<'_>>, BrowserError> {
        self.record("query");
        Ok((0..self.page.posts.len())
            .map(|index| MockPostHandle {
                posts: &self.page.posts,
                index,
                session: self,
            })
            .collect())
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        self.record("close");
        if self.page.close_fails {
            Err(BrowserError::automation("close", "browser already gone"))
        } else {
            Ok(())
        }
    }
}

/// Handle to a scripted post; its ancestors are found by following `parent`.
pub struct MockPostHandle<'a> {
    posts: &'a [MockPost],
    index: usize,
    session: &'a MockSession,
}

impl MockPostHandle<'_> {
    fn post(&self) -> &MockPost {
        &self.posts[self.index]
    }

    /// Whether the element at `index` is this element or nested inside it.
    fn contains(&self, index: usize) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            if i == self.index {
                return true;
            }
            current = self.posts[i].parent;
        }
        false
    }
}

impl AncestorWalk for MockPostHandle<'_> {
    fn parent_element(&self) -> Result<Option<Self>, BrowserError> {
        Ok(self.post().parent.map(|index| MockPostHandle {
            posts: self.posts,
            index,
            session: self.session,
        }))
    }
}

impl PostHandle for MockPostHandle<'_> {
    fn is_nested(&self, _post_selector: &str) -> Result<bool, BrowserError> {
        if let Some(error) = &self.post().nested_error {
            return Err(error.clone());
        }
        // Every scripted element is a post, so any ancestor counts.
        has_ancestor_matching(self, |_| true)
    }

    fn expand(&self, _post_selector: &str, _labels: &[String]) -> Result<bool, BrowserError> {
        if let Some(error) = &self.post().expand_error {
            return Err(error.clone());
        }
        // Controls are searched across this element and everything nested in
        // it. Every scripted element is a post, so a control's closest post is
        // the element that holds it.
        for (index, candidate) in self.posts.iter().enumerate() {
            let collapsed = candidate.expanded_text.is_some() && !candidate.expanded.get();
            if !collapsed || !self.contains(index) {
                continue;
            }
            if index != self.index {
                self.session.record(format!("skip control {index}"));
                continue;
            }
            candidate.expanded.set(true);
            self.session.record(format!("expand {index}"));
            return Ok(true);
        }
        Ok(false)
    }

    fn inner_text(&self) -> Result<String, BrowserError> {
        let post = self.post();
        self.session.record(format!("text {}", self.index));
        if let Some(error) = &post.text_error {
            return Err(error.clone());
        }
        Ok(match (&post.expanded_text, post.expanded.get()) {
            (Some(full), true) => full.clone(),
            _ => post.text.clone(),
        })
    }
}
