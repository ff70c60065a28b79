//! Split plan resolution: turning `[split]` into absolute source sets and
//! output paths.

use crate::error::ConfigError;
use crate::types::ZincConfig;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A partition with its sources and output resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPartition {
    /// The partition name.
    pub name: String,
    /// Where the partition's analysis is written.
    pub output: PathBuf,
    /// Source paths, as they appear in the analysis.
    pub sources: BTreeSet<String>,
}

/// A fully resolved split plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    /// Partitions in output order.
    pub partitions: Vec<ResolvedPartition>,
    /// Output of the catch-all partition, if enabled.
    pub catchall_output: Option<PathBuf>,
}

/// Resolves the `[split]` section of `config`.
///
/// Relative source paths are joined onto `split.root` when it is set.
/// Relative output paths are joined onto `base_dir`, normally the directory
/// holding the configuration file.
pub fn resolve_split_plan(config: &ZincConfig, base_dir: &Path) -> Result<SplitPlan, ConfigError> {
    let split = config
        .split
        .as_ref()
        .ok_or_else(|| ConfigError::MissingField("split".to_string()))?;

    let resolve_source = |source: &str| match &split.root {
        Some(root) if Path::new(source).is_relative() => root.join(source).display().to_string(),
        _ => source.to_string(),
    };

    let partitions = split
        .partition
        .iter()
        .map(|p| ResolvedPartition {
            name: p.name.clone(),
            output: base_dir.join(&p.output),
            sources: p.sources.iter().map(|s| resolve_source(s.as_str())).collect(),
        })
        .collect();

    let catchall_output = if split.catchall {
        split.catchall_output.as_ref().map(|o| base_dir.join(o))
    } else {
        None
    };

    Ok(SplitPlan {
        partitions,
        catchall_output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    fn plan(toml: &str) -> SplitPlan {
        let config = load_config_from_str(toml).unwrap();
        resolve_split_plan(&config, Path::new("/cfg")).unwrap()
    }

    #[test]
    fn relative_sources_join_root() {
        let plan = plan(
            r#"
[split]
root = "/buildroot"

[[split.partition]]
name = "core"
output = "out/core.analysis"
sources = ["src/A.scala", "/abs/B.scala"]
"#,
        );
        let core = &plan.partitions[0];
        assert_eq!(core.output, PathBuf::from("/cfg/out/core.analysis"));
        assert!(core.sources.contains("/buildroot/src/A.scala"));
        assert!(core.sources.contains("/abs/B.scala"));
        assert_eq!(plan.catchall_output, None);
    }

    #[test]
    fn sources_stay_verbatim_without_root() {
        let plan = plan(
            r#"
[[split.partition]]
name = "core"
output = "/abs/core.analysis"
sources = ["src/A.scala"]
"#,
        );
        let core = &plan.partitions[0];
        assert_eq!(core.output, PathBuf::from("/abs/core.analysis"));
        assert!(core.sources.contains("src/A.scala"));
    }

    #[test]
    fn catchall_output_is_resolved() {
        let plan = plan(
            r#"
[split]
catchall = true
catchall_output = "rest.analysis"
"#,
        );
        assert!(plan.partitions.is_empty());
        assert_eq!(plan.catchall_output, Some(PathBuf::from("/cfg/rest.analysis")));
    }

    #[test]
    fn disabled_catchall_ignores_output() {
        let plan = plan(
            r#"
[split]
catchall_output = "rest.analysis"
"#,
        );
        assert_eq!(plan.catchall_output, None);
    }

    #[test]
    fn missing_split_section_errors() {
        let config = load_config_from_str("").unwrap();
        let err = resolve_split_plan(&config, Path::new(".")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "split"));
    }
}
