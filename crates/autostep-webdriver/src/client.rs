//! WebDriver request/response envelope.

use reqwest::Method;
use serde_json::Value;
use tracing::trace;

use crate::error::WebDriverError;

pub type Result<T> = std::result::Result<T, WebDriverError>;

/// Key under which W3C drivers return element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Clone)]
pub struct Client {
    base: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Send one command and return the `value` member of the response.
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base, path);
        trace!(%method, %url, "webdriver command");
        let mut req = self.http.request(method, &url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        let mut envelope: Value = serde_json::from_str(&text)
            .map_err(|_| WebDriverError::InvalidResponse(format!("{status}: {text}")))?;
        let value = envelope
            .get_mut("value")
            .map(Value::take)
            .unwrap_or(Value::Null);

        if !status.is_success() {
            let error = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(WebDriverError::Command { error, message });
        }
        Ok(value)
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, None).await
    }
}

/// Extract the element id from a find-element response.
pub fn element_id(value: &Value) -> Result<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| WebDriverError::InvalidResponse(format!("no element reference in {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unwraps_value() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/session/s1/url")
            .with_body(r#"{"value": "https://demo.example/"}"#)
            .create_async()
            .await;
        let client = Client::new(server.url());
        assert_eq!(client.get("/session/s1/url").await.unwrap(), json!("https://demo.example/"));
    }

    #[tokio::test]
    async fn decodes_w3c_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/session/s1/element")
            .with_status(404)
            .with_body(r#"{"value": {"error": "no such element", "message": "Unable to locate", "stacktrace": ""}}"#)
            .create_async()
            .await;
        let client = Client::new(server.url());
        let err = client
            .post("/session/s1/element", json!({"using": "css selector", "value": "#x"}))
            .await
            .unwrap_err();
        assert!(err.is_no_such_element());
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/status")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;
        let client = Client::new(server.url());
        assert!(matches!(
            client.get("/status").await,
            Err(WebDriverError::InvalidResponse(_))
        ));
    }

    #[test]
    fn element_id_reads_w3c_key() {
        let v = json!({"element-6066-11e4-a52e-4f735466cecf": "abc"});
        assert_eq!(element_id(&v).unwrap(), "abc");
        assert!(element_id(&json!({})).is_err());
    }
}
