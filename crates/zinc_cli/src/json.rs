//! `zinc json`: export an analysis as JSON.

use crate::{GlobalArgs, JsonArgs};

/// Runs the `zinc json` command, writing to stdout unless `--output` is given.
pub fn run(args: &JsonArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let analysis = zinc_analysis::parse_path(&args.input)?;
    let json = zinc_analysis::to_json(&analysis)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            tracing::info!(output = %path.display(), "wrote JSON");
        }
        None => println!("{json}"),
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zinc_analysis::Analysis;

    #[test]
    fn json_to_file() {
        let tmp = TempDir::new().unwrap();
        let mut analysis = Analysis::new();
        analysis.relations.classes.insert("A.scala", "A");
        let input = tmp.path().join("a.analysis");
        zinc_analysis::write_path(&analysis, &input, &[]).unwrap();

        let output = tmp.path().join("a.json");
        let args = JsonArgs {
            input,
            output: Some(output.clone()),
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);

        let text = std::fs::read_to_string(output).unwrap();
        assert!(text.contains("\"class names\""));
        assert!(text.contains("\"A.scala\""));
    }
}
