//! Wiring shared by `serve` and `run`: config sections turned into the
//! execution environment.

use anyhow::Context;
use autostep_core::asset::{AssetOrigin, AssetStore, HttpAssetOrigin};
use autostep_core::config::Config;
use autostep_core::env::ExecEnv;
use autostep_core::events::EventBus;
use autostep_core::human::ConfirmationGate;
use autostep_webdriver::WebDriverBrowser;
use std::path::Path;
use std::sync::Arc;

pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load(root).with_context(|| format!("loading config under {}", root.display()))
}

/// Execution environment backed by the WebDriver endpoint at `webdriver`
/// (or `webdriver.url`).
pub fn exec_env(
    root: &Path,
    config: &Config,
    events: &EventBus,
    webdriver: Option<&str>,
) -> ExecEnv {
    let url = webdriver.unwrap_or(&config.webdriver.url);
    let browser =
        Arc::new(WebDriverBrowser::new(url).with_capabilities(&config.webdriver.capabilities));
    let origin = config
        .asset_origin()
        .map(|base| Arc::new(HttpAssetOrigin::new(base)) as Arc<dyn AssetOrigin>);
    let assets = Arc::new(AssetStore::new(config.assets_dir(root), origin));
    let gate = Arc::new(ConfirmationGate::new(events.clone()));

    ExecEnv::new(browser, gate, assets)
        .with_timeouts(config.timeouts())
        .with_max_condition_retries(config.orchestrator.max_condition_retries)
}
