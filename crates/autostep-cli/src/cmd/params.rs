use anyhow::Context;
use autostep_core::parameters::ParameterStore;
use clap::Subcommand;
use std::path::Path;

use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum ParamsSubcommand {
    /// List every parameter
    List,
    /// Print one parameter (empty when unset)
    Get { key: String },
    /// Set and persist a parameter
    Set { key: String, value: String },
    /// Remove a parameter
    Unset { key: String },
}

pub fn run(root: &Path, subcmd: ParamsSubcommand, json: bool) -> anyhow::Result<()> {
    let store = ParameterStore::open(root).context("opening the parameter store")?;
    match subcmd {
        ParamsSubcommand::List => {
            let all = store.all();
            if json {
                print_json(&all)?;
            } else if all.is_empty() {
                println!("no parameters set");
            } else {
                let rows: Vec<Vec<String>> = all.into_iter().map(|(k, v)| vec![k, v]).collect();
                print_table(&["KEY", "VALUE"], &rows);
            }
        }
        ParamsSubcommand::Get { key } => {
            let value = store.get(&key);
            if json {
                print_json(&serde_json::json!({ "key": key, "value": value }))?;
            } else {
                println!("{value}");
            }
        }
        ParamsSubcommand::Set { key, value } => {
            store.set(&key, &value)?;
            if json {
                print_json(&serde_json::json!({ "key": key, "value": value }))?;
            } else {
                println!("{key} = {value}");
            }
        }
        ParamsSubcommand::Unset { key } => {
            let removed = store.remove(&key)?;
            if json {
                print_json(&serde_json::json!({ "key": key, "removed": removed }))?;
            } else if removed {
                println!("removed {key}");
            } else {
                println!("{key} was not set");
            }
        }
    }
    Ok(())
}
