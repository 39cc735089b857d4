//! Local cache of upload assets, filled from a remote origin on miss.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AutostepError, Result};

/// Source of asset bytes for cache misses.
#[async_trait]
pub trait AssetOrigin: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Fetches `GET {base}{path}`.
pub struct HttpAssetOrigin {
    base: String,
    client: reqwest::Client,
}

impl HttpAssetOrigin {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AssetOrigin for HttpAssetOrigin {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        debug!(%url, "fetching asset");
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}

pub struct AssetStore {
    dir: PathBuf,
    origin: Option<Arc<dyn AssetOrigin>>,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>, origin: Option<Arc<dyn AssetOrigin>>) -> Self {
        Self {
            dir: dir.into(),
            origin,
        }
    }

    /// Where `asset` lives in the cache. Absolute-looking asset paths are
    /// taken relative to the cache; parent components are rejected.
    pub fn local_path(&self, asset: &str) -> Result<PathBuf> {
        let rel = Path::new(asset.trim_start_matches('/'));
        if asset.trim().is_empty()
            || rel
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AutostepError::InvalidAssetPath(asset.to_string()));
        }
        Ok(self.dir.join(rel))
    }

    /// Return the cached file for `asset`, downloading it first if absent.
    pub async fn ensure(&self, asset: &str) -> Result<PathBuf> {
        let path = self.local_path(asset)?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }

        let origin = self
            .origin
            .as_ref()
            .ok_or_else(|| AutostepError::NotConfigured(format!("asset origin for '{asset}'")))?;
        let bytes = origin
            .fetch(asset)
            .await
            .map_err(|e| AutostepError::AssetFetch {
                path: asset.to_string(),
                reason: e.to_string(),
            })?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || crate::io::atomic_write(&target, &bytes))
            .await
            .map_err(|e| AutostepError::AssetFetch {
                path: asset.to_string(),
                reason: e.to_string(),
            })??;
        info!(asset, path = %path.display(), "asset downloaded");
        Ok(path)
    }
}
