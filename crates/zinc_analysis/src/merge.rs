//! Merging the analyses of disjoint source sets into one analysis.
//!
//! Tables are unioned, then every external dependency whose class is now
//! declared by a source of the merged analysis is turned back into an internal
//! source → source dependency.

use std::collections::BTreeMap;

use crate::analysis::{Analysis, Compilations, DependencyKind, Scope, SECTIONS};
use crate::error::PreconditionViolation;
use crate::relation_map::RelationMap;

/// Merges `analyses` into a single analysis.
///
/// The inputs must cover pairwise-disjoint source sets: a key present in two
/// inputs' source-keyed tables is reported as
/// [`PreconditionViolation::OverlappingKey`]. Tables keyed by binaries or
/// outside classes may repeat keys; the later input wins.
///
/// The compile setup of the first input is kept. Compilation timestamps of all
/// inputs are deduplicated, sorted and re-indexed. Merging no analyses yields
/// an empty analysis.
#[tracing::instrument(level = "debug", skip_all, fields(inputs = analyses.len()))]
pub fn merge(analyses: &[Analysis]) -> Result<Analysis, PreconditionViolation> {
    let mut merged = Analysis::new();

    {
        let mut targets = merged.tables_mut();
        for (index, spec) in SECTIONS.iter().enumerate() {
            let inputs = analyses.iter().map(|a| a.tables()[index]);
            *targets[index] = match spec.scope {
                Scope::Owned => union_disjoint(inputs, spec.header)?,
                Scope::Shared => union_shared(inputs, spec.header),
                Scope::Global => continue,
            };
        }
    }

    // Classes whose declaring source is part of the merged analysis.
    let internal_classes: BTreeMap<String, String> = merged
        .relations
        .class_sources()
        .into_iter()
        .filter(|(_, source)| merged.relations.src_prod.contains_key(source))
        .map(|(class, source)| (class.to_string(), source.to_string()))
        .collect();

    let mut internalized = 0;
    for kind in DependencyKind::ALL {
        let (internal, external) = merged.relations.dependency_pair_mut(kind);
        internalized += internalize(internal, external, &internal_classes);
    }

    let external_apis = std::mem::take(&mut merged.apis.external);
    for (class, digests) in &external_apis {
        match internal_classes.get(class) {
            Some(source) => {
                merged.apis.internal.replace(source.clone(), digests.clone());
            }
            None => {
                merged.apis.external.replace(class.clone(), digests.clone());
            }
        }
    }

    merged.compilations = Compilations::from_tokens(
        analyses
            .iter()
            .flat_map(|a| a.compilations.compilations.values()),
    );
    merged.compile_setup = analyses
        .first()
        .map(|a| a.compile_setup.clone())
        .unwrap_or_default();

    tracing::debug!(
        sources = merged.stamps.sources.len(),
        internalized,
        "merged analyses"
    );
    Ok(merged)
}

/// Moves every edge of `external` whose class resolves to a merged source
/// into `internal`. Returns the number of edges moved.
fn internalize(
    internal: &mut RelationMap,
    external: &mut RelationMap,
    internal_classes: &BTreeMap<String, String>,
) -> usize {
    let naive_external = std::mem::take(external);
    let mut moved = 0;
    for (source, class) in naive_external.pairs() {
        match internal_classes.get(class) {
            Some(target) => {
                internal.insert(source, target.as_str());
                moved += 1;
            }
            None => {
                external.insert(source, class);
            }
        }
    }
    moved
}

/// Unions tables whose keys must not repeat across inputs.
fn union_disjoint<'a, I>(tables: I, section: &'static str) -> Result<RelationMap, PreconditionViolation>
where
    I: Iterator<Item = &'a RelationMap>,
{
    let mut owners: BTreeMap<&str, usize> = BTreeMap::new();
    let mut out = RelationMap::new();
    for (index, table) in tables.enumerate() {
        for (key, values) in table {
            if let Some(&first) = owners.get(key.as_str()) {
                return Err(PreconditionViolation::OverlappingKey {
                    first,
                    second: index,
                    section,
                    key: key.clone(),
                });
            }
            owners.insert(key, index);
            out.replace(key.clone(), values.clone());
        }
    }
    Ok(out)
}

/// Unions tables whose keys may repeat across inputs. Later inputs win.
fn union_shared<'a, I>(tables: I, section: &'static str) -> RelationMap
where
    I: Iterator<Item = &'a RelationMap>,
{
    let mut out = RelationMap::new();
    for table in tables {
        for (key, values) in table {
            if let Some(previous) = out.replace(key.clone(), values.clone()) {
                if &previous != values {
                    tracing::debug!(section, key = %key, "later analysis replaces differing entry");
                }
            }
        }
    }
    out
}
