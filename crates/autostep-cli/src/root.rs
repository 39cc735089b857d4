use autostep_core::paths::AUTOSTEP_DIR;
use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `AUTOSTEP_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.autostep/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_marked_ancestor(&cwd).unwrap_or(cwd)
}

fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(AUTOSTEP_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_autostep_dir_above() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".autostep")).unwrap();
        let subdir = dir.path().join("sites/deep");
        std::fs::create_dir_all(&subdir).unwrap();
        assert_eq!(find_marked_ancestor(&subdir).as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_marker_found() {
        let dir = TempDir::new().unwrap();
        assert!(find_marked_ancestor(dir.path()).is_none());
    }
}
