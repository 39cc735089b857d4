//! Remote job source: pending jobs, job state reports and site definitions.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{AutostepError, Result};
use crate::job::{Job, JobState};
use crate::site::Site;

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn pending_jobs(&self) -> Result<Vec<Job>>;

    async fn update_job(&self, id: &str, state: JobState) -> Result<()>;

    async fn site(&self, name: &str) -> Result<Site>;
}

/// Talks to the application API under `{base}/api`.
pub struct HttpJobSource {
    base: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct JobUpdate {
    state: JobState,
}

impl HttpJobSource {
    pub fn new(base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/api/{}", self.base, path);
        debug!(%method, %url, "remote request");
        let req = self.client.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn pending_jobs(&self) -> Result<Vec<Job>> {
        let resp = self
            .request(reqwest::Method::GET, "jobs/pending")
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn update_job(&self, id: &str, state: JobState) -> Result<()> {
        self.request(reqwest::Method::POST, &format!("jobs/{id}"))
            .json(&JobUpdate { state })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn site(&self, name: &str) -> Result<Site> {
        let resp = self
            .request(reqwest::Method::GET, &format!("sites/{name}"))
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AutostepError::SiteNotFound(name.to_string()));
        }
        let mut site: Site = resp.error_for_status()?.json().await?;
        if site.name.is_empty() {
            site.name = name.to_string();
        }
        Ok(site)
    }
}
