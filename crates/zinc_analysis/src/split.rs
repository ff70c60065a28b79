//! Splitting one analysis into per-partition analyses.
//!
//! Source-keyed tables are partitioned by key. Internal dependencies whose
//! target lands in another partition are externalized: the target source is
//! replaced by its representative class, and the target's API digest is copied
//! into the partition's external APIs so the dependency can still be checked.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::analysis::{Analysis, DependencyKind};
use crate::error::PreconditionViolation;
use crate::relation_map::RelationMap;

/// Splits `analysis` into one analysis per partition, in partition order.
///
/// With `catchall`, one more analysis is appended holding every source not
/// named by any partition. Without it, such sources are dropped from all
/// outputs.
///
/// Every output carries the input's compilations and compile setup
/// unchanged. Fails if a source appears in two partitions, or if a dependency
/// must be externalized to a source that declares no classes.
#[tracing::instrument(level = "debug", skip_all, fields(partitions = partitions.len(), catchall = catchall))]
pub fn split(
    analysis: &Analysis,
    partitions: &[BTreeSet<String>],
    catchall: bool,
) -> Result<Vec<Analysis>, PreconditionViolation> {
    let mut owners: BTreeMap<&str, usize> = BTreeMap::new();
    for (index, partition) in partitions.iter().enumerate() {
        for source in partition {
            if let Some(&first) = owners.get(source.as_str()) {
                return Err(PreconditionViolation::OverlappingPartitions {
                    first,
                    second: index,
                    source_file: source.clone(),
                });
            }
            owners.insert(source, index);
        }
    }

    let remainder: Option<BTreeSet<String>> = catchall.then(|| {
        analysis
            .sources()
            .filter(|s| !owners.contains_key(s))
            .map(str::to_string)
            .collect()
    });
    let parts: Vec<&BTreeSet<String>> = partitions.iter().chain(remainder.as_ref()).collect();

    parts
        .par_iter()
        .map(|part| split_one(analysis, part))
        .collect()
}

/// Builds the analysis of a single partition.
fn split_one(analysis: &Analysis, part: &BTreeSet<String>) -> Result<Analysis, PreconditionViolation> {
    let member = |key: &str| part.contains(key);
    let relations = &analysis.relations;
    let mut out = Analysis::new();

    out.relations.src_prod = relations.src_prod.restrict(member);
    out.relations.binary_dep = relations.binary_dep.restrict(member);
    out.relations.classes = relations.classes.restrict(member);
    out.relations.used = relations.used.restrict(member);

    // Sources whose dependents in this partition now see them as external.
    let mut externalized: BTreeSet<&str> = BTreeSet::new();
    for kind in DependencyKind::ALL {
        let (all_internal, all_external) = relations.dependency_pair(kind);
        let mut internal = RelationMap::new();
        let mut external = all_external.restrict(member);
        for (source, target) in all_internal.pairs().filter(|(s, _)| member(*s)) {
            if member(target) {
                internal.insert(source, target);
                continue;
            }
            let representative = relations.representative(target).ok_or_else(|| {
                PreconditionViolation::NoRepresentative {
                    source_file: target.to_string(),
                    dependent: source.to_string(),
                    section: kind.internal_header(),
                }
            })?;
            external.insert(source, representative);
            externalized.insert(target);
        }
        let (internal_slot, external_slot) = out.relations.dependency_pair_mut(kind);
        *internal_slot = internal;
        *external_slot = external;
    }

    let stamps = &analysis.stamps;
    let products: BTreeSet<&str> = out.relations.src_prod.values().collect();
    let binaries: BTreeSet<&str> = out.relations.binary_dep.values().collect();
    out.stamps.products = stamps.products.restrict(|k| products.contains(k));
    out.stamps.sources = stamps.sources.restrict(member);
    out.stamps.binaries = stamps.binaries.restrict(|k| binaries.contains(k));
    out.stamps.classnames = stamps.classnames.restrict(|k| binaries.contains(k));

    let representatives: BTreeSet<&str> = part
        .iter()
        .filter_map(|s| relations.representative(s))
        .collect();
    let referenced: BTreeSet<&str> = DependencyKind::ALL
        .iter()
        .flat_map(|kind| out.relations.dependency_pair(*kind).1.values())
        .collect();
    out.apis.internal = analysis.apis.internal.restrict(member);
    out.apis.external = analysis
        .apis
        .external
        .restrict(|class| representatives.contains(class) || referenced.contains(class));
    for target in &externalized {
        if let (Some(class), Some(digests)) = (
            relations.representative(target),
            analysis.apis.internal.get(target),
        ) {
            out.apis.external.replace(class, digests.clone());
        }
    }

    out.source_infos.source_infos = analysis.source_infos.source_infos.restrict(member);
    out.compilations = analysis.compilations.clone();
    out.compile_setup = analysis.compile_setup.clone();

    tracing::debug!(
        sources = out.stamps.sources.len(),
        externalized = externalized.len(),
        "split partition"
    );
    Ok(out)
}
