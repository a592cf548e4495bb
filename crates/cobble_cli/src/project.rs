//! Project root discovery and entry path resolution.

use std::path::{Path, PathBuf};

use cobble_common::{clean_path, UnitPath};
use cobble_config::{ProjectConfig, CONFIG_FILE};

use crate::GlobalArgs;

/// A located project: its root directory and parsed configuration.
#[derive(Debug)]
pub struct Project {
    /// Absolute project root. All tool invocations run here.
    pub root: PathBuf,
    /// The parsed `cobble.toml`, or defaults when there is none.
    pub config: ProjectConfig,
}

/// Walks up from `start` looking for the nearest directory containing `cobble.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Locates the project and loads its configuration.
///
/// If `--config` is specified, uses that path (file → parent dir and that
/// file, dir → itself). Otherwise walks up from `cwd` looking for
/// `cobble.toml`, falling back to `cwd` with default settings.
pub fn load_project(global: &GlobalArgs, cwd: &Path) -> Result<Project, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = clean_path(&cwd.join(config_path));
        if p.is_file() {
            let root = p.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
            let content = std::fs::read_to_string(&p)
                .map_err(|e| format!("failed to read {}: {e}", p.display()))?;
            let config = cobble_config::load_config_from_str(&content)?;
            return Ok(Project { root, config });
        }
        if !p.is_dir() {
            return Err(format!("config path {} does not exist", p.display()).into());
        }
        let config = cobble_config::load_config(&p)?;
        return Ok(Project { root: p, config });
    }

    let root = find_project_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
    let config = cobble_config::load_config(&root)?;
    Ok(Project { root, config })
}

/// Resolves `entry` against `cwd` and expresses it relative to `root`.
///
/// An entry outside the project stays absolute.
pub fn entry_unit(cwd: &Path, root: &Path, entry: &str) -> UnitPath {
    let absolute = clean_path(&cwd.join(entry));
    match absolute.strip_prefix(clean_path(root)) {
        Ok(rel) => UnitPath::new(rel),
        Err(_) => UnitPath::new(absolute),
    }
}
