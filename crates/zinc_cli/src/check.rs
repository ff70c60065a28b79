//! `zinc check`: parse analysis files and report what they contain.

use std::path::Path;

use zinc_analysis::Analysis;

use crate::{CheckArgs, GlobalArgs};

/// Runs the `zinc check` command.
///
/// Every file is parsed; files that fail are reported and checking
/// continues. Returns exit code 0 if all files parsed, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut failures = 0;
    for path in &args.files {
        match zinc_analysis::parse_path(path) {
            Ok(analysis) => {
                if !global.quiet {
                    println!("{}", summary(path, &analysis));
                }
                if global.verbose {
                    for line in section_report(&analysis) {
                        println!("  {line}");
                    }
                }
            }
            Err(e) => {
                eprintln!("error: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        tracing::warn!(failures, checked = args.files.len(), "some analyses failed to parse");
        return Ok(1);
    }
    Ok(0)
}

/// One-line summary of a parsed analysis.
fn summary(path: &Path, analysis: &Analysis) -> String {
    format!(
        "{}: ok, {} sources, {} products, {} items",
        path.display(),
        analysis.stamps.sources.len(),
        analysis.relations.src_prod.pair_count(),
        analysis.item_count()
    )
}

/// Item counts of every non-empty section.
fn section_report(analysis: &Analysis) -> Vec<String> {
    analysis
        .sections()
        .filter(|(_, table)| !table.is_empty())
        .map(|(spec, table)| format!("{}/{}: {} items", spec.group, spec.header, table.pair_count()))
        .collect()
}
