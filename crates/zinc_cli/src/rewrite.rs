//! `zinc rewrite`: canonicalize an analysis, applying rebasing rules.

use crate::pipeline::{load_config, rebasings};
use crate::{GlobalArgs, RewriteArgs};

/// Runs the `zinc rewrite` command.
pub fn run(args: &RewriteArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (config, _) = load_config(global)?;
    let rules = rebasings(&config);

    let analysis = zinc_analysis::parse_path(&args.input)?;
    zinc_analysis::write_path(&analysis, &args.output, &rules)?;

    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        rebasings = rules.len(),
        "rewrote analysis"
    );
    Ok(0)
}
