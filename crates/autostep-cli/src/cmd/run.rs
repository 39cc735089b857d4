use anyhow::{anyhow, bail};
use autostep_core::args::{ArgumentContext, Product};
use autostep_core::events::{EventBus, OrchestratorEvent};
use autostep_core::human::ConfirmationGate;
use autostep_core::parameters::ParameterStore;
use autostep_core::script::{run_script, ScriptOutcome};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use crate::output::print_json;
use crate::setup;

#[derive(Serialize)]
struct RunReport<'a> {
    site: &'a str,
    script: &'a str,
    outcome: &'static str,
}

pub fn run(
    root: &Path,
    site: &str,
    script: &str,
    raw_args: &[String],
    webdriver: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = setup::load_config(root)?;
    let site = super::load_site(root, site)?;
    let job_args = parse_args(raw_args)?;
    let parameters = ParameterStore::open(root)?.all();
    let args = ArgumentContext::layered(&parameters, &job_args, &Product::new());

    let events = EventBus::new();
    let env = setup::exec_env(root, &config, &events, webdriver);

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async {
        let prompter = tokio::spawn(prompt_for_confirmations(events, env.gate.clone()));
        let outcome = run_script(&site, script, &args, None, &env).await;
        prompter.abort();
        outcome
    })?;

    let label = match &outcome {
        ScriptOutcome::Completed(_) => "completed",
        ScriptOutcome::Held(_) => "held",
        ScriptOutcome::Aborted => "aborted",
    };
    if let ScriptOutcome::Completed(page) = outcome {
        if let Err(e) = rt.block_on(page.close()) {
            tracing::warn!(error = %e, "closing page failed");
        }
    }

    if json {
        print_json(&RunReport {
            site: &site.name,
            script,
            outcome: label,
        })?;
    } else {
        println!("{}/{}: {}", site.name, script, label);
    }

    if label == "aborted" {
        bail!("script '{script}' aborted");
    }
    Ok(())
}

/// `key=value` pairs; the value may itself contain `=`.
fn parse_args(raw: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|pair| {
            let (k, v) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("argument '{pair}' is not KEY=VALUE"))?;
            if k.is_empty() {
                bail!("argument '{pair}' has an empty key");
            }
            Ok((k.to_string(), v.to_string()))
        })
        .collect()
}

/// Without a control surface, a human pause is answered on the terminal.
async fn prompt_for_confirmations(events: EventBus, gate: Arc<ConfirmationGate>) {
    let mut rx = events.subscribe();
    while let Ok(event) = rx.recv().await {
        let OrchestratorEvent::HumanRequired { message, .. } = event else {
            continue;
        };
        eprintln!("{message}");
        eprintln!("press Enter to continue");
        let read = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| ())
        })
        .await;
        if !matches!(read, Ok(Ok(()))) {
            return;
        }
        gate.acknowledge();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args_splits_on_first_equals() {
        let parsed = parse_args(&["user=alice".into(), "query=a=b".into(), "empty=".into()]).unwrap();
        assert_eq!(parsed["user"], "alice");
        assert_eq!(parsed["query"], "a=b");
        assert_eq!(parsed["empty"], "");
    }

    #[test]
    fn parse_args_rejects_bad_pairs() {
        assert!(parse_args(&["novalue".into()]).is_err());
        assert!(parse_args(&["=x".into()]).is_err());
    }
}
