use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const AUTOSTEP_DIR: &str = ".autostep";
pub const SITES_DIR: &str = ".autostep/sites";
pub const ASSETS_DIR: &str = ".autostep/assets";

pub const CONFIG_FILE: &str = ".autostep/config.yaml";
pub const PARAMETERS_FILE: &str = ".autostep/parameters.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn parameters_path(root: &Path) -> PathBuf {
    root.join(PARAMETERS_FILE)
}

pub fn default_assets_dir(root: &Path) -> PathBuf {
    root.join(ASSETS_DIR)
}

/// Local site definition, looked up as `<name>.yaml` then `<name>.json`.
pub fn site_file(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(SITES_DIR);
    let yaml = dir.join(format!("{name}.yaml"));
    if yaml.exists() {
        return yaml;
    }
    dir.join(format!("{name}.json"))
}
