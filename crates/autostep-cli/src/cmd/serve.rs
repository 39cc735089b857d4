use anyhow::{anyhow, Context};
use autostep_core::events::EventBus;
use autostep_core::orchestrator::{Orchestrator, OrchestratorSettings};
use autostep_core::parameters::ParameterStore;
use autostep_core::remote::HttpJobSource;
use autostep_server::AppState;
use std::path::Path;
use std::sync::Arc;

use crate::setup;

pub fn run(root: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let config = setup::load_config(root)?;
    for w in config.validate() {
        tracing::warn!("{}", w.message);
    }
    let remote = config
        .remote
        .url
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| anyhow!("remote.url is not set in .autostep/config.yaml"))?;
    let port = port.unwrap_or(config.server.port);

    let parameters =
        Arc::new(ParameterStore::open(root).context("opening the parameter store")?);
    let events = EventBus::new();
    let env = setup::exec_env(root, &config, &events, None);
    let source = Arc::new(HttpJobSource::new(remote.as_str(), config.remote.token.clone()));
    let orchestrator = Orchestrator::new(source, env, parameters, events)
        .with_settings(OrchestratorSettings::from(&config.orchestrator));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let handle = orchestrator.start();
        tracing::info!(remote = %remote, "orchestrator started");

        let result = tokio::select! {
            r = autostep_server::serve(AppState::new(orchestrator), port) => r,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        };
        handle.stop();
        result
    })
}
