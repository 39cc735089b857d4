//! Page-driver capability consumed by the interpreter.
//!
//! The interpreter never launches or manages a browser. It receives a
//! [`Browser`] able to open pages and drives each [`Page`] through the
//! selector-addressed operations below.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("timed out after {after:?} waiting for '{selector}'")]
    Timeout { selector: String, after: Duration },

    #[error("no element matches '{0}'")]
    NoSuchElement(String),

    #[error("page is closed")]
    Closed,

    #[error("driver protocol error: {0}")]
    Protocol(String),
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// One open page of the automated browser.
#[async_trait]
pub trait Page: Send + Sync {
    /// Current URL of the page.
    async fn url(&self) -> DriverResult<String>;

    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Resolve once `selector` matches an element, or fail with
    /// [`DriverError::Timeout`] after `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> DriverResult<()>;

    async fn click(&self, selector: &str) -> DriverResult<()>;

    /// Type into the focused element, pausing `delay` between characters.
    async fn type_text(&self, text: &str, delay: Duration) -> DriverResult<()>;

    /// Read a DOM property (e.g. `checked`, `childElementCount`) of the first
    /// element matching `selector`.
    async fn property(&self, selector: &str, name: &str) -> DriverResult<serde_json::Value>;

    /// URLs of every frame in the page.
    async fn frame_urls(&self) -> DriverResult<Vec<String>>;

    /// Attach a local file to the file input matching `selector`.
    async fn upload_file(&self, selector: &str, path: &Path) -> DriverResult<()>;

    async fn close(&self) -> DriverResult<()>;
}

pub type PageBox = Box<dyn Page>;

/// Opens pages on the externally managed browser session.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_page(&self) -> DriverResult<PageBox>;
}
