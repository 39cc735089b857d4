pub mod params;
pub mod resume;
pub mod run;
pub mod serve;
pub mod validate;

use anyhow::Context;
use autostep_core::paths;
use autostep_core::site::Site;
use std::path::{Path, PathBuf};

/// `site` is a path when it names an existing file, otherwise a site name
/// under `.autostep/sites/`.
pub(crate) fn site_path(root: &Path, site: &str) -> PathBuf {
    let direct = PathBuf::from(site);
    if direct.is_file() {
        direct
    } else {
        paths::site_file(root, site)
    }
}

pub(crate) fn load_site(root: &Path, site: &str) -> anyhow::Result<Site> {
    let path = site_path(root, site);
    Site::load(&path).with_context(|| format!("loading site {}", path.display()))
}
