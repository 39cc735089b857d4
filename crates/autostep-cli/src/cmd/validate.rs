use anyhow::bail;
use autostep_core::config::WarnLevel;
use std::path::Path;

use crate::output::print_json;

pub fn run(root: &Path, site: &str, json: bool) -> anyhow::Result<()> {
    let site = super::load_site(root, site)?;
    let warnings = site.validate();
    let errors = warnings
        .iter()
        .filter(|w| w.level == WarnLevel::Error)
        .count();

    if json {
        print_json(&serde_json::json!({
            "site": site.name,
            "scripts": site.scripts.len(),
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("{}: {} script(s), no problems", site.name, site.scripts.len());
    } else {
        for w in &warnings {
            let tag = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{tag}: {}", w.message);
        }
    }

    if errors > 0 {
        bail!("site '{}' has {errors} error(s)", site.name);
    }
    Ok(())
}
