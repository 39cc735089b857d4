//! In-memory page driver that records every call, for tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::driver::{Browser, DriverError, DriverResult, Page, PageBox};
use crate::error::{AutostepError, Result};
use crate::job::{Job, JobState};
use crate::remote::JobSource;
use crate::site::Site;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    Navigate(String),
    WaitFor(String),
    Click(String),
    Type(String),
    Property(String, String),
    Frames,
    Upload(String, PathBuf),
    Close,
}

#[derive(Debug, Default)]
struct FakeState {
    url: String,
    selectors: BTreeSet<String>,
    properties: BTreeMap<(String, String), serde_json::Value>,
    frames: Vec<String>,
    hidden_by_click: BTreeMap<String, Vec<String>>,
    shown_by_click: BTreeMap<String, Vec<String>>,
    calls: Vec<PageCall>,
    closed: bool,
}

/// Scripted page. Clones share state, so a test keeps one clone to inspect
/// calls while the interpreter owns another.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(self, url: &str) -> Self {
        self.lock().url = url.to_string();
        self
    }

    pub fn with_selector(self, selector: &str) -> Self {
        self.add_selector(selector);
        self
    }

    pub fn with_property(self, selector: &str, name: &str, value: serde_json::Value) -> Self {
        self.lock()
            .properties
            .insert((selector.to_string(), name.to_string()), value);
        self
    }

    pub fn with_frame(self, url: &str) -> Self {
        self.lock().frames.push(url.to_string());
        self
    }

    /// Clicking `trigger` makes `target` disappear from the page.
    pub fn click_hides(self, trigger: &str, target: &str) -> Self {
        self.lock()
            .hidden_by_click
            .entry(trigger.to_string())
            .or_default()
            .push(target.to_string());
        self
    }

    pub fn click_reveals(self, trigger: &str, target: &str) -> Self {
        self.lock()
            .shown_by_click
            .entry(trigger.to_string())
            .or_default()
            .push(target.to_string());
        self
    }

    pub fn add_selector(&self, selector: &str) {
        self.lock().selectors.insert(selector.to_string());
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.lock().calls.clone()
    }

    /// Calls other than waits and property reads.
    pub fn effects(&self) -> Vec<PageCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, PageCall::WaitFor(_) | PageCall::Property(..) | PageCall::Frames))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn boxed(&self) -> PageBox {
        Box::new(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, call: PageCall) -> DriverResult<MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        if state.closed {
            return Err(DriverError::Closed);
        }
        state.calls.push(call);
        Ok(state)
    }
}

#[async_trait]
impl Page for FakePage {
    async fn url(&self) -> DriverResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.record(PageCall::Navigate(url.to_string()))?;
        state.url = url.to_string();
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> DriverResult<()> {
        let state = self.record(PageCall::WaitFor(selector.to_string()))?;
        if state.selectors.contains(selector) {
            Ok(())
        } else {
            Err(DriverError::Timeout {
                selector: selector.to_string(),
                after: timeout,
            })
        }
    }

    async fn click(&self, selector: &str) -> DriverResult<()> {
        let mut state = self.record(PageCall::Click(selector.to_string()))?;
        if !state.selectors.contains(selector) {
            return Err(DriverError::NoSuchElement(selector.to_string()));
        }
        if let Some(hidden) = state.hidden_by_click.get(selector).cloned() {
            for target in hidden {
                state.selectors.remove(&target);
            }
        }
        if let Some(shown) = state.shown_by_click.get(selector).cloned() {
            state.selectors.extend(shown);
        }
        Ok(())
    }

    async fn type_text(&self, text: &str, _delay: Duration) -> DriverResult<()> {
        self.record(PageCall::Type(text.to_string()))?;
        Ok(())
    }

    async fn property(&self, selector: &str, name: &str) -> DriverResult<serde_json::Value> {
        let state = self.record(PageCall::Property(selector.to_string(), name.to_string()))?;
        if !state.selectors.contains(selector) {
            return Err(DriverError::NoSuchElement(selector.to_string()));
        }
        Ok(state
            .properties
            .get(&(selector.to_string(), name.to_string()))
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn frame_urls(&self) -> DriverResult<Vec<String>> {
        let state = self.record(PageCall::Frames)?;
        Ok(state.frames.clone())
    }

    async fn upload_file(&self, selector: &str, path: &Path) -> DriverResult<()> {
        let state = self.record(PageCall::Upload(selector.to_string(), path.to_path_buf()))?;
        if state.selectors.contains(selector) {
            Ok(())
        } else {
            Err(DriverError::NoSuchElement(selector.to_string()))
        }
    }

    async fn close(&self) -> DriverResult<()> {
        let mut state = self.lock();
        state.calls.push(PageCall::Close);
        state.closed = true;
        Ok(())
    }
}

/// Hands out clones of one [`FakePage`], reopening it when asked.
#[derive(Debug, Default)]
pub struct FakeBrowser {
    page: FakePage,
    opened: AtomicUsize,
}

impl FakeBrowser {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            opened: AtomicUsize::new(0),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_page(&self) -> DriverResult<PageBox> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.page.lock().closed = false;
        Ok(self.page.boxed())
    }
}

/// In-memory job source. Jobs stay pending until they are reported.
#[derive(Debug, Default)]
pub struct MemoryJobSource {
    jobs: Mutex<Vec<Job>>,
    sites: Mutex<BTreeMap<String, Site>>,
    updates: Mutex<Vec<(String, JobState)>>,
    site_fetches: AtomicUsize,
    fail_updates: std::sync::atomic::AtomicBool,
}

impl MemoryJobSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(self, site: Site) -> Self {
        lock(&self.sites).insert(site.name.clone(), site);
        self
    }

    pub fn push_job(&self, job: Job) {
        lock(&self.jobs).push(job);
    }

    pub fn remove_job(&self, id: &str) {
        lock(&self.jobs).retain(|j| j.id != id);
    }

    /// Reported `(id, state)` pairs in order.
    pub fn updates(&self) -> Vec<(String, JobState)> {
        lock(&self.updates).clone()
    }

    pub fn site_fetches(&self) -> usize {
        self.site_fetches.load(Ordering::SeqCst)
    }

    /// Make every later `update_job` call fail.
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

#[async_trait]
impl JobSource for MemoryJobSource {
    async fn pending_jobs(&self) -> Result<Vec<Job>> {
        let reported = self.updates();
        Ok(lock(&self.jobs)
            .iter()
            .filter(|j| !reported.iter().any(|(id, _)| *id == j.id))
            .cloned()
            .collect())
    }

    async fn update_job(&self, id: &str, state: JobState) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AutostepError::Remote("update rejected".into()));
        }
        lock(&self.updates).push((id.to_string(), state));
        Ok(())
    }

    async fn site(&self, name: &str) -> Result<Site> {
        self.site_fetches.fetch_add(1, Ordering::SeqCst);
        lock(&self.sites)
            .get(name)
            .cloned()
            .ok_or_else(|| AutostepError::SiteNotFound(name.to_string()))
    }
}
