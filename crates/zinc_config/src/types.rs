//! Configuration types deserialized from `zinc.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The top-level configuration parsed from `zinc.toml`.
///
/// Every section is optional; an empty file is a valid configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ZincConfig {
    /// Rewrites applied, in order, to every item written out.
    #[serde(default)]
    pub rebase: Vec<RebaseRule>,
    /// How `zinc split` partitions an analysis.
    #[serde(default)]
    pub split: Option<SplitConfig>,
    /// Settings for `zinc anonymize`.
    #[serde(default)]
    pub anonymize: AnonymizeConfig,
}

/// A single substring rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RebaseRule {
    /// Text to look for.
    pub from: String,
    /// Replacement. Without it, items mentioning `from` are dropped.
    #[serde(default)]
    pub to: Option<String>,
}

/// The `[split]` section: a list of partitions and an optional catch-all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SplitConfig {
    /// Directory relative partition sources are resolved against.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Whether to write the sources no partition names to `catchall_output`.
    #[serde(default)]
    pub catchall: bool,
    /// Output file of the catch-all partition.
    #[serde(default)]
    pub catchall_output: Option<PathBuf>,
    /// Partitions, in output order.
    #[serde(default)]
    pub partition: Vec<PartitionSpec>,
}

/// One `[[split.partition]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct PartitionSpec {
    /// Unique partition name, used in messages.
    pub name: String,
    /// Output analysis file.
    pub output: PathBuf,
    /// Source files belonging to this partition.
    #[serde(default)]
    pub sources: Vec<String>,
}

/// The `[anonymize]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnonymizeConfig {
    /// File of replacement words, whitespace-separated.
    #[serde(default)]
    pub words: Option<PathBuf>,
    /// Seed for word order and generated blobs.
    #[serde(default)]
    pub seed: u64,
    /// Words kept as they are. Replaces the built-in list when set.
    #[serde(default)]
    pub keep: Option<Vec<String>>,
    /// Fixed word replacements. Replaces the built-in map when set.
    #[serde(default)]
    pub rename: Option<BTreeMap<String, String>>,
}
