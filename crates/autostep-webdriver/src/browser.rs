use async_trait::async_trait;
use autostep_core::driver::{Browser, DriverError, DriverResult, PageBox};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::info;

use crate::client::Client;
use crate::page::WebDriverPage;

/// Opens one WebDriver session per page on an existing driver endpoint.
pub struct WebDriverBrowser {
    client: Client,
    capabilities: Map<String, Value>,
}

impl WebDriverBrowser {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(url),
            capabilities: Map::new(),
        }
    }

    /// `alwaysMatch` capabilities sent with every new session.
    pub fn with_capabilities(mut self, capabilities: &BTreeMap<String, Value>) -> Self {
        self.capabilities = capabilities
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn new_page(&self) -> DriverResult<PageBox> {
        let value = self
            .client
            .post(
                "/session",
                json!({"capabilities": {"alwaysMatch": self.capabilities}}),
            )
            .await?;
        let session = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Protocol(format!("no sessionId in {value}")))?;
        info!(session, endpoint = self.client.base(), "webdriver session opened");
        Ok(Box::new(WebDriverPage::new(self.client.clone(), session)))
    }
}
