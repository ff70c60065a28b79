//! `zinc split`: partition an analysis by the configured split plan.

use std::collections::BTreeSet;
use std::path::PathBuf;

use zinc_config::resolve_split_plan;

use crate::pipeline::{load_config, rebasings};
use crate::{GlobalArgs, SplitArgs};

/// Runs the `zinc split` command.
///
/// Reads the `[split]` section of the configuration, splits the input into
/// one analysis per partition (plus the catch-all, if enabled) and writes
/// each to its configured output.
pub fn run(args: &SplitArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (config, base_dir) = load_config(global)?;
    let plan = resolve_split_plan(&config, &base_dir)?;

    let analysis = zinc_analysis::parse_path(&args.input)?;
    let partitions: Vec<BTreeSet<String>> = plan.partitions.iter().map(|p| p.sources.clone()).collect();
    let parts = zinc_analysis::split(&analysis, &partitions, plan.catchall_output.is_some())?;

    let outputs: Vec<(&str, &PathBuf)> = plan
        .partitions
        .iter()
        .map(|p| (p.name.as_str(), &p.output))
        .chain(plan.catchall_output.as_ref().map(|o| ("catch-all", o)))
        .collect();

    let rules = rebasings(&config);
    for ((name, output), part) in outputs.iter().zip(&parts) {
        zinc_analysis::write_path(part, output, &rules)?;
        tracing::info!(
            partition = *name,
            sources = part.stamps.sources.len(),
            output = %output.display(),
            "wrote partition"
        );
    }

    let covered: usize = parts.iter().map(|p| p.stamps.sources.len()).sum();
    let dropped = analysis.stamps.sources.len().saturating_sub(covered);
    if dropped > 0 {
        tracing::warn!(dropped, "sources not covered by any partition were dropped");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zinc_analysis::Analysis;

    fn chain() -> Analysis {
        let mut a = Analysis::new();
        for (source, class) in [("/ws/a/A.scala", "A"), ("/ws/b/B.scala", "B"), ("/ws/c/C.scala", "C")] {
            a.stamps.sources.insert(source, "hash(1)");
            a.relations.classes.insert(source, class);
            a.relations.src_prod.insert(source, format!("/out/{class}.class"));
        }
        a.relations.internal_src_dep.insert("/ws/b/B.scala", "/ws/a/A.scala");
        a
    }

    fn setup(config: &str) -> (TempDir, GlobalArgs, SplitArgs) {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("zinc.toml");
        std::fs::write(&config_path, config).unwrap();
        let input = tmp.path().join("all.analysis");
        zinc_analysis::write_path(&chain(), &input, &[]).unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(config_path.display().to_string()),
        };
        (tmp, global, SplitArgs { input })
    }

    #[test]
    fn split_writes_partitions_and_catchall() {
        let (tmp, global, args) = setup(
            r#"
[split]
root = "/ws"
catchall = true
catchall_output = "out/rest.analysis"

[[split.partition]]
name = "a"
output = "out/a.analysis"
sources = ["a/A.scala"]

[[split.partition]]
name = "b"
output = "out/b.analysis"
sources = ["/ws/b/B.scala"]
"#,
        );
        assert_eq!(run(&args, &global).unwrap(), 0);

        let a = zinc_analysis::parse_path(&tmp.path().join("out/a.analysis")).unwrap();
        assert_eq!(a.sources().collect::<Vec<_>>(), vec!["/ws/a/A.scala"]);

        let b = zinc_analysis::parse_path(&tmp.path().join("out/b.analysis")).unwrap();
        assert!(b.relations.external_dep.contains("/ws/b/B.scala", "A"));

        let rest = zinc_analysis::parse_path(&tmp.path().join("out/rest.analysis")).unwrap();
        assert_eq!(rest.sources().collect::<Vec<_>>(), vec!["/ws/c/C.scala"]);
    }

    #[test]
    fn split_without_plan_errors() {
        let (_tmp, global, args) = setup("");
        let err = run(&args, &global).unwrap_err();
        assert!(err.to_string().contains("split"));
    }

    #[test]
    fn overlapping_partitions_error() {
        let (_tmp, global, args) = setup(
            r#"
[[split.partition]]
name = "one"
output = "one.analysis"
sources = ["/ws/a/A.scala"]

[[split.partition]]
name = "two"
output = "two.analysis"
sources = ["/ws/a/A.scala"]
"#,
        );
        let err = run(&args, &global).unwrap_err();
        assert!(err.to_string().contains("/ws/a/A.scala"));
    }
}
