//! Reading, writing, merging and splitting zinc incremental-compilation
//! analyses.
//!
//! An [`Analysis`] records, for a set of compiled source files, what each
//! source produces and depends on, content stamps, API digests and the
//! compiler setup. This crate parses and writes the line-oriented text format
//! ([`parse_path`], [`write_path`]), merges analyses of disjoint source sets
//! ([`merge`]) and splits one analysis into several ([`split`]), rewriting
//! dependencies that cross the new boundaries.

#![warn(missing_docs)]

pub mod analysis;
pub mod anonymize;
pub mod error;
pub mod json;
pub mod merge;
pub mod parser;
pub mod relation_map;
pub mod split;
pub mod writer;

pub use analysis::{
    Analysis, Apis, CompileSetup, Compilations, DependencyKind, Layout, Relations, Scope,
    SectionSpec, SourceInfos, Stamps, SECTIONS, SECTION_COUNT,
};
pub use anonymize::{Redactor, WordRedactor};
pub use error::{AnalysisError, AnalysisResult, FormatError, FormatErrorKind, PreconditionViolation};
pub use json::to_json;
pub use merge::merge;
pub use parser::{parse_path, parse_str, FORMAT_VERSION_LINE, MEMORY_ORIGIN};
pub use relation_map::RelationMap;
pub use split::split;
pub use writer::{to_text, write_path, write_to, Rebasing};
