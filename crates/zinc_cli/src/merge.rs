//! `zinc merge`: combine analyses of disjoint source sets.

use crate::pipeline::{load_config, parse_all, rebasings};
use crate::{GlobalArgs, MergeArgs};

/// Runs the `zinc merge` command.
///
/// Inputs are parsed in parallel, merged in command-line order, and the
/// result is written with the configured rebasings.
pub fn run(args: &MergeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (config, _) = load_config(global)?;

    let analyses = parse_all(&args.inputs)?;
    let merged = zinc_analysis::merge(&analyses)?;
    zinc_analysis::write_path(&merged, &args.output, &rebasings(&config))?;

    tracing::info!(
        inputs = analyses.len(),
        sources = merged.stamps.sources.len(),
        output = %args.output.display(),
        "merged analyses"
    );
    Ok(0)
}
