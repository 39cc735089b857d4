use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env::Timeouts;
use crate::error::Result;
use crate::paths;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Where jobs and site definitions come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Cache directory, relative to the project root unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Base URL assets are downloaded from; defaults to `remote.url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebDriverConfig {
    #[serde(default = "default_webdriver_url")]
    pub url: String,
    /// Extra `alwaysMatch` capabilities sent when a session is created.
    #[serde(default)]
    pub capabilities: BTreeMap<String, serde_json::Value>,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            capabilities: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3142
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_interval")]
    pub fetch_interval_secs: u64,
    #[serde(default = "default_interval")]
    pub run_interval_secs: u64,
    #[serde(default = "default_condition_retries")]
    pub max_condition_retries: u32,
}

fn default_interval() -> u64 {
    10
}

fn default_condition_retries() -> u32 {
    3
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch_interval_secs: default_interval(),
            run_interval_secs: default_interval(),
            max_condition_retries: default_condition_retries(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_selector_ms")]
    pub selector_ms: u64,
    #[serde(default = "default_cookie_ms")]
    pub cookie_ms: u64,
    #[serde(default = "default_cookie_settle_ms")]
    pub cookie_settle_ms: u64,
    #[serde(default = "default_type_delay_ms")]
    pub type_delay_ms: u64,
}

fn default_selector_ms() -> u64 {
    5000
}

fn default_cookie_ms() -> u64 {
    5000
}

fn default_cookie_settle_ms() -> u64 {
    3000
}

fn default_type_delay_ms() -> u64 {
    100
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            selector_ms: default_selector_ms(),
            cookie_ms: default_cookie_ms(),
            cookie_settle_ms: default_cookie_settle_ms(),
            type_delay_ms: default_type_delay_ms(),
        }
    }
}

impl From<&TimeoutsConfig> for Timeouts {
    fn from(c: &TimeoutsConfig) -> Self {
        Timeouts {
            selector: Duration::from_millis(c.selector_ms),
            cookie: Duration::from_millis(c.cookie_ms),
            cookie_settle: Duration::from_millis(c.cookie_settle_ms),
            type_delay: Duration::from_millis(c.type_delay_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

impl Config {
    /// Load `.autostep/config.yaml`; an absent or empty file gives defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn assets_dir(&self, root: &Path) -> PathBuf {
        match &self.assets.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => paths::default_assets_dir(root),
        }
    }

    pub fn asset_origin(&self) -> Option<&str> {
        self.assets
            .origin
            .as_deref()
            .or(self.remote.url.as_deref())
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts::from(&self.timeouts)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.remote.url.as_deref().map_or(true, str::is_empty) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "remote.url is not set; `autostep serve` cannot fetch jobs".to_string(),
            });
        }

        if self.orchestrator.fetch_interval_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "orchestrator.fetch_interval_secs must be greater than 0".to_string(),
            });
        }
        if self.orchestrator.run_interval_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "orchestrator.run_interval_secs must be greater than 0".to_string(),
            });
        }
        if self.orchestrator.max_condition_retries == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "orchestrator.max_condition_retries is 0; scripts with a condition \
                          fail as soon as it is not met"
                    .to_string(),
            });
        }

        if self.timeouts.selector_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "timeouts.selector_ms is 0; every selector wait fails immediately"
                    .to_string(),
            });
        }

        warnings
    }
}
