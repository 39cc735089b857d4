//! One WebDriver session driven as a [`Page`].

use async_trait::async_trait;
use autostep_core::driver::{DriverError, DriverResult, Page};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::client::{element_id, Client};
use crate::error::WebDriverError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const FRAME_URLS_SCRIPT: &str = "return [location.href].concat(\
    Array.from(document.querySelectorAll('iframe, frame')).map(function (f) { return f.src; }));";

pub struct WebDriverPage {
    client: Client,
    session: String,
    closed: AtomicBool,
}

impl WebDriverPage {
    pub fn new(client: Client, session: impl Into<String>) -> Self {
        Self {
            client,
            session: session.into(),
            closed: AtomicBool::new(false),
        }
    }

    fn path(&self, rest: &str) -> String {
        format!("/session/{}{}", self.session, rest)
    }

    fn check_open(&self) -> DriverResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::Closed);
        }
        Ok(())
    }

    async fn find(&self, selector: &str) -> DriverResult<String> {
        self.check_open()?;
        let found = self
            .client
            .post(
                &self.path("/element"),
                json!({"using": "css selector", "value": selector}),
            )
            .await;
        match found {
            Ok(value) => Ok(element_id(&value)?),
            Err(e) if e.is_no_such_element() => Err(DriverError::NoSuchElement(selector.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn send_keys(&self, element: &str, text: &str) -> Result<Value, WebDriverError> {
        self.client
            .post(
                &self.path(&format!("/element/{element}/value")),
                json!({ "text": text }),
            )
            .await
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn url(&self) -> DriverResult<String> {
        self.check_open()?;
        let value = self.client.get(&self.path("/url")).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.check_open()?;
        debug!(session = %self.session, url, "navigate");
        self.client.post(&self.path("/url"), json!({ "url": url })).await?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> DriverResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find(selector).await {
                Ok(_) => return Ok(()),
                Err(DriverError::NoSuchElement(_)) => {}
                Err(e) => return Err(e),
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(DriverError::Timeout {
                    selector: selector.to_string(),
                    after: timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn click(&self, selector: &str) -> DriverResult<()> {
        let element = self.find(selector).await?;
        self.client
            .post(&self.path(&format!("/element/{element}/click")), json!({}))
            .await?;
        Ok(())
    }

    async fn type_text(&self, text: &str, delay: Duration) -> DriverResult<()> {
        self.check_open()?;
        let active = self.client.get(&self.path("/element/active")).await?;
        let element = element_id(&active)?;
        let mut buf = [0u8; 4];
        for (i, ch) in text.chars().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.send_keys(&element, ch.encode_utf8(&mut buf)).await?;
        }
        Ok(())
    }

    async fn property(&self, selector: &str, name: &str) -> DriverResult<Value> {
        let element = self.find(selector).await?;
        Ok(self
            .client
            .get(&self.path(&format!("/element/{element}/property/{name}")))
            .await?)
    }

    async fn frame_urls(&self) -> DriverResult<Vec<String>> {
        self.check_open()?;
        let value = self
            .client
            .post(
                &self.path("/execute/sync"),
                json!({"script": FRAME_URLS_SCRIPT, "args": []}),
            )
            .await?;
        Ok(value
            .as_array()
            .map(|urls| {
                urls.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upload_file(&self, selector: &str, path: &Path) -> DriverResult<()> {
        let element = self.find(selector).await?;
        let absolute = std::path::absolute(path)
            .map_err(|e| DriverError::Protocol(format!("{}: {e}", path.display())))?;
        self.send_keys(&element, &absolute.to_string_lossy()).await?;
        Ok(())
    }

    async fn close(&self) -> DriverResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!(session = %self.session, "deleting session");
        match self.client.delete(&format!("/session/{}", self.session)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_session_gone() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const FOUND: &str = r#"{"value": {"element-6066-11e4-a52e-4f735466cecf": "e1"}}"#;
    const NOT_FOUND: &str =
        r#"{"value": {"error": "no such element", "message": "Unable to locate element"}}"#;

    fn page(server: &Server) -> WebDriverPage {
        WebDriverPage::new(Client::new(server.url()), "s1")
    }

    #[tokio::test]
    async fn navigate_posts_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/session/s1/url")
            .match_body(Matcher::Json(json!({"url": "https://demo.example/login"})))
            .with_body(r#"{"value": null}"#)
            .create_async()
            .await;
        page(&server).navigate("https://demo.example/login").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn click_finds_then_clicks() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/session/s1/element")
            .match_body(Matcher::Json(json!({"using": "css selector", "value": "#buy"})))
            .with_body(FOUND)
            .create_async()
            .await;
        let click = server
            .mock("POST", "/session/s1/element/e1/click")
            .with_body(r#"{"value": null}"#)
            .create_async()
            .await;
        page(&server).click("#buy").await.unwrap();
        click.assert_async().await;
    }

    #[tokio::test]
    async fn wait_for_missing_selector_times_out() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/session/s1/element")
            .with_status(404)
            .with_body(NOT_FOUND)
            .expect_at_least(2)
            .create_async()
            .await;
        let err = page(&server)
            .wait_for_selector("#never", Duration::from_millis(250))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Timeout { ref selector, .. } if selector == "#never"));
    }

    #[tokio::test]
    async fn property_reads_value() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/session/s1/element")
            .with_body(FOUND)
            .create_async()
            .await;
        server
            .mock("GET", "/session/s1/element/e1/property/childElementCount")
            .with_body(r#"{"value": 3}"#)
            .create_async()
            .await;
        let count = page(&server)
            .property("#list", "childElementCount")
            .await
            .unwrap();
        assert_eq!(count, json!(3));
    }

    #[tokio::test]
    async fn type_text_sends_each_character() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/session/s1/element/active")
            .with_body(FOUND)
            .create_async()
            .await;
        let keys = server
            .mock("POST", "/session/s1/element/e1/value")
            .with_body(r#"{"value": null}"#)
            .expect(3)
            .create_async()
            .await;
        page(&server).type_text("abc", Duration::ZERO).await.unwrap();
        keys.assert_async().await;
    }

    #[tokio::test]
    async fn frame_urls_from_script() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/session/s1/execute/sync")
            .with_body(r#"{"value": ["https://demo.example/", "https://captcha.example/x"]}"#)
            .create_async()
            .await;
        let frames = page(&server).frame_urls().await.unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[1].contains("captcha"));
    }

    #[tokio::test]
    async fn close_deletes_session_once() {
        let mut server = Server::new_async().await;
        let delete = server
            .mock("DELETE", "/session/s1")
            .with_body(r#"{"value": null}"#)
            .expect(1)
            .create_async()
            .await;
        let page = page(&server);
        page.close().await.unwrap();
        page.close().await.unwrap();
        delete.assert_async().await;
        assert!(matches!(page.url().await, Err(DriverError::Closed)));
    }
}
