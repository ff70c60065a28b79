//! Shared helpers for CLI commands.
//!
//! Configuration discovery, rebasing rules, and parallel parsing of input
//! analyses.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use zinc_analysis::{Analysis, AnalysisResult, Rebasing};
use zinc_config::{ZincConfig, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `zinc.toml`.
pub fn find_config_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

/// Loads the configuration selected by the global CLI args.
///
/// With `--config`, loads that file (or `zinc.toml` in that directory).
/// Otherwise walks up from the current directory; if no `zinc.toml` is found
/// the default (empty) configuration is used. Returns the configuration and
/// the directory relative output paths are resolved against.
pub fn load_config(global: &GlobalArgs) -> Result<(ZincConfig, PathBuf), Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_dir() {
            return Ok((zinc_config::load_config(&p)?, p));
        }
        let base = p
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        return Ok((zinc_config::load_config_file(&p)?, base));
    }

    let cwd = std::env::current_dir()?;
    match find_config_dir(&cwd) {
        Some(dir) => {
            tracing::debug!(dir = %dir.display(), "using configuration");
            Ok((zinc_config::load_config(&dir)?, dir))
        }
        None => Ok((ZincConfig::default(), cwd)),
    }
}

/// Converts the configured rebasing rules for the writer.
pub fn rebasings(config: &ZincConfig) -> Vec<Rebasing> {
    config
        .rebase
        .iter()
        .map(|rule| Rebasing {
            from: rule.from.clone(),
            to: rule.to.clone(),
        })
        .collect()
}

/// Parses every path in parallel, preserving input order.
pub fn parse_all(paths: &[PathBuf]) -> AnalysisResult<Vec<Analysis>> {
    paths
        .par_iter()
        .map(|p| zinc_analysis::parse_path(p))
        .collect()
}

/// Reads a whitespace-separated word list.
pub fn read_words(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read word list {}: {e}", path.display()))?;
    Ok(text.split_whitespace().map(str::to_string).collect())
}
