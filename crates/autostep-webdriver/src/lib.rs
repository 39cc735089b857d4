//! `autostep-webdriver`: page driver speaking the W3C WebDriver protocol.
//!
//! Talks JSON over HTTP to an already running driver endpoint
//! (chromedriver, geckodriver, a Selenium grid). Launching that endpoint and
//! the browser behind it is the caller's business; this crate only opens and
//! deletes sessions on it.
//!
//! ```text
//! WebDriverBrowser  ← Browser: POST /session per page
//!     │
//!     ▼
//! WebDriverPage     ← Page: element lookup, clicks, keys, properties
//!     │
//!     ▼
//! Client            ← request/response envelope, W3C error decoding
//! ```

pub mod browser;
pub mod client;
pub mod error;
pub mod page;

pub use browser::WebDriverBrowser;
pub use error::WebDriverError;
pub use page::WebDriverPage;
