//! The analysis document: six groups of key → value-set tables.
//!
//! An [`Analysis`] is pure data. The parser and writer walk its tables through
//! [`Analysis::tables`] and [`Analysis::tables_mut`], which enumerate all 26
//! tables in canonical [`SECTIONS`] order; the merge and split engines access
//! the named fields directly.

use std::collections::BTreeMap;

use crate::relation_map::RelationMap;

/// How a section writes the value of each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `key -> value` on one line.
    Inline,
    /// `key -> ` on one line, the value on the next. Used for large opaque
    /// blobs.
    Block,
}

/// What the keys of a section identify, and therefore how analyses of
/// disjoint source sets may share them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Keyed by a source file or a class file it produces. A key belongs to
    /// exactly one analysis of a partitioned build.
    Owned,
    /// Keyed by a binary dependency or an outside class. Several analyses may
    /// legitimately carry the same key.
    Shared,
    /// Describes the compiler invocation as a whole.
    Global,
}

/// Static description of one section of the text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    /// Name of the group the section belongs to (`relations`, `stamps`, ...).
    pub group: &'static str,
    /// Human-readable header written before the section, without the colon.
    pub header: &'static str,
    /// Inline or block value layout.
    pub layout: Layout,
    /// What the keys identify.
    pub scope: Scope,
}

const fn inline(group: &'static str, header: &'static str, scope: Scope) -> SectionSpec {
    SectionSpec {
        group,
        header,
        layout: Layout::Inline,
        scope,
    }
}

const fn block(group: &'static str, header: &'static str, scope: Scope) -> SectionSpec {
    SectionSpec {
        group,
        header,
        layout: Layout::Block,
        scope,
    }
}

/// Number of sections in an analysis.
pub const SECTION_COUNT: usize = 26;

use Scope::{Global, Owned, Shared};

/// Every section in the order it appears in the text format.
///
/// Note that `class names` appears twice: once for the classes each source
/// declares and once for the class name stamped on each binary.
pub static SECTIONS: [SectionSpec; SECTION_COUNT] = [
    inline("relations", "products", Owned),
    inline("relations", "binary dependencies", Owned),
    inline("relations", "direct source dependencies", Owned),
    inline("relations", "direct external dependencies", Owned),
    inline("relations", "public inherited source dependencies", Owned),
    inline("relations", "public inherited external dependencies", Owned),
    inline("relations", "member reference internal dependencies", Owned),
    inline("relations", "member reference external dependencies", Owned),
    inline("relations", "inheritance internal dependencies", Owned),
    inline("relations", "inheritance external dependencies", Owned),
    inline("relations", "class names", Owned),
    inline("relations", "used names", Owned),
    inline("stamps", "product stamps", Owned),
    inline("stamps", "source stamps", Owned),
    inline("stamps", "binary stamps", Shared),
    inline("stamps", "class names", Shared),
    block("apis", "internal apis", Owned),
    block("apis", "external apis", Shared),
    block("source_infos", "source infos", Owned),
    block("compilations", "compilations", Global),
    inline("compile_setup", "output mode", Global),
    inline("compile_setup", "output directories", Global),
    inline("compile_setup", "compile options", Global),
    inline("compile_setup", "javac options", Global),
    inline("compile_setup", "compiler version", Global),
    inline("compile_setup", "compile order", Global),
];

/// Which kind of edges a dependency pair records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// Direct source dependencies.
    Direct,
    /// Dependencies through publicly inherited members.
    PublicInherited,
    /// Dependencies through member references.
    MemberReference,
    /// Dependencies through type inheritance.
    Inheritance,
}

impl DependencyKind {
    /// All dependency kinds, in section order.
    pub const ALL: [DependencyKind; 4] = [
        DependencyKind::Direct,
        DependencyKind::PublicInherited,
        DependencyKind::MemberReference,
        DependencyKind::Inheritance,
    ];

    /// Header of the internal (source → source) section.
    pub fn internal_header(self) -> &'static str {
        match self {
            DependencyKind::Direct => SECTIONS[2].header,
            DependencyKind::PublicInherited => SECTIONS[4].header,
            DependencyKind::MemberReference => SECTIONS[6].header,
            DependencyKind::Inheritance => SECTIONS[8].header,
        }
    }
}

/// Source-level relations recorded by the compiler.
///
/// Every table is keyed by source file path. Internal dependency tables map
/// to other source files of the same analysis; external ones map to class
/// names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    /// Class files produced by each source.
    pub src_prod: RelationMap,
    /// Binaries (jars, class directories) each source depends on.
    pub binary_dep: RelationMap,
    /// Direct dependencies on sources of this analysis.
    pub internal_src_dep: RelationMap,
    /// Direct dependencies on classes outside this analysis.
    pub external_dep: RelationMap,
    /// Publicly inherited dependencies on sources of this analysis.
    pub internal_src_dep_pi: RelationMap,
    /// Publicly inherited dependencies on outside classes.
    pub external_dep_pi: RelationMap,
    /// Member-reference dependencies on sources of this analysis.
    pub member_ref_internal_dep: RelationMap,
    /// Member-reference dependencies on outside classes.
    pub member_ref_external_dep: RelationMap,
    /// Inheritance dependencies on sources of this analysis.
    pub inheritance_internal_dep: RelationMap,
    /// Inheritance dependencies on outside classes.
    pub inheritance_external_dep: RelationMap,
    /// Classes declared by each source.
    pub classes: RelationMap,
    /// Names used by each source.
    pub used: RelationMap,
}

impl Relations {
    /// Returns the `(internal, external)` tables for a dependency kind.
    pub fn dependency_pair(&self, kind: DependencyKind) -> (&RelationMap, &RelationMap) {
        match kind {
            DependencyKind::Direct => (&self.internal_src_dep, &self.external_dep),
            DependencyKind::PublicInherited => (&self.internal_src_dep_pi, &self.external_dep_pi),
            DependencyKind::MemberReference => {
                (&self.member_ref_internal_dep, &self.member_ref_external_dep)
            }
            DependencyKind::Inheritance => {
                (&self.inheritance_internal_dep, &self.inheritance_external_dep)
            }
        }
    }

    /// Mutable access to the `(internal, external)` tables for a dependency kind.
    pub fn dependency_pair_mut(
        &mut self,
        kind: DependencyKind,
    ) -> (&mut RelationMap, &mut RelationMap) {
        match kind {
            DependencyKind::Direct => (&mut self.internal_src_dep, &mut self.external_dep),
            DependencyKind::PublicInherited => {
                (&mut self.internal_src_dep_pi, &mut self.external_dep_pi)
            }
            DependencyKind::MemberReference => (
                &mut self.member_ref_internal_dep,
                &mut self.member_ref_external_dep,
            ),
            DependencyKind::Inheritance => (
                &mut self.inheritance_internal_dep,
                &mut self.inheritance_external_dep,
            ),
        }
    }

    /// Builds the reverse index from each declared class to the source
    /// declaring it.
    ///
    /// A class declared by several sources is attributed to the
    /// lexicographically last of them, and a warning is logged.
    pub fn class_sources(&self) -> BTreeMap<&str, &str> {
        let mut index = BTreeMap::new();
        for (source, class) in self.classes.pairs() {
            if let Some(previous) = index.insert(class, source) {
                tracing::warn!(class, previous, source, "class declared by more than one source");
            }
        }
        index
    }

    /// Returns the representative class of `source`: the lexicographically
    /// smallest class it declares.
    pub fn representative(&self, source: &str) -> Option<&str> {
        self.classes.first(source)
    }

    fn tables(&self) -> [&RelationMap; 12] {
        [
            &self.src_prod,
            &self.binary_dep,
            &self.internal_src_dep,
            &self.external_dep,
            &self.internal_src_dep_pi,
            &self.external_dep_pi,
            &self.member_ref_internal_dep,
            &self.member_ref_external_dep,
            &self.inheritance_internal_dep,
            &self.inheritance_external_dep,
            &self.classes,
            &self.used,
        ]
    }

    fn tables_mut(&mut self) -> [&mut RelationMap; 12] {
        [
            &mut self.src_prod,
            &mut self.binary_dep,
            &mut self.internal_src_dep,
            &mut self.external_dep,
            &mut self.internal_src_dep_pi,
            &mut self.external_dep_pi,
            &mut self.member_ref_internal_dep,
            &mut self.member_ref_external_dep,
            &mut self.inheritance_internal_dep,
            &mut self.inheritance_external_dep,
            &mut self.classes,
            &mut self.used,
        ]
    }
}

/// Content fingerprints of every file the analysis knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stamps {
    /// Stamp of each produced class file.
    pub products: RelationMap,
    /// Stamp of each source file. The keys of this table define which
    /// sources the analysis contains.
    pub sources: RelationMap,
    /// Stamp of each binary dependency.
    pub binaries: RelationMap,
    /// Class name recorded for each binary dependency.
    pub classnames: RelationMap,
}

/// Serialized API digests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Apis {
    /// API of each source of this analysis, keyed by source path.
    pub internal: RelationMap,
    /// API of each outside class this analysis depends on, keyed by class name.
    pub external: RelationMap,
}

/// Opaque per-source diagnostic blobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInfos {
    /// Blob for each source file.
    pub source_infos: RelationMap,
}

/// Timestamps of the compiler runs that contributed to the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilations {
    /// Zero-padded ordinal → timestamp token.
    pub compilations: RelationMap,
}

impl Compilations {
    /// Builds a dense, zero-padded index (`000`, `001`, ...) over the given
    /// timestamp tokens, deduplicated and sorted.
    pub fn from_tokens<'a, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let sorted: std::collections::BTreeSet<&str> = tokens.into_iter().collect();
        let compilations = sorted
            .into_iter()
            .enumerate()
            .map(|(i, token)| (format!("{i:03}"), token))
            .collect();
        Self { compilations }
    }
}

/// Compiler configuration. Global to the whole analysis, never per source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileSetup {
    /// Output mode (single or multiple output directories).
    pub output_mode: RelationMap,
    /// Output directories.
    pub output_dirs: RelationMap,
    /// Scala compiler options.
    pub compile_options: RelationMap,
    /// Java compiler options.
    pub javac_options: RelationMap,
    /// Compiler version.
    pub compiler_version: RelationMap,
    /// Mixed-compilation order.
    pub compile_order: RelationMap,
}

/// A complete zinc analysis.
///
/// Operations that combine or partition analyses take their inputs by shared
/// reference and build new, independently owned analyses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Source-level relations.
    pub relations: Relations,
    /// File fingerprints.
    pub stamps: Stamps,
    /// API digests.
    pub apis: Apis,
    /// Per-source diagnostic blobs.
    pub source_infos: SourceInfos,
    /// Compiler run timestamps.
    pub compilations: Compilations,
    /// Compiler configuration.
    pub compile_setup: CompileSetup,
}

impl Analysis {
    /// Creates an empty analysis with a default compile setup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over the source files this analysis contains.
    pub fn sources(&self) -> impl Iterator<Item = &str> + '_ {
        self.stamps.sources.keys()
    }

    /// Returns every table in canonical [`SECTIONS`] order.
    pub fn tables(&self) -> [&RelationMap; SECTION_COUNT] {
        let [r0, r1, r2, r3, r4, r5, r6, r7, r8, r9, r10, r11] = self.relations.tables();
        let cs = &self.compile_setup;
        [
            r0,
            r1,
            r2,
            r3,
            r4,
            r5,
            r6,
            r7,
            r8,
            r9,
            r10,
            r11,
            &self.stamps.products,
            &self.stamps.sources,
            &self.stamps.binaries,
            &self.stamps.classnames,
            &self.apis.internal,
            &self.apis.external,
            &self.source_infos.source_infos,
            &self.compilations.compilations,
            &cs.output_mode,
            &cs.output_dirs,
            &cs.compile_options,
            &cs.javac_options,
            &cs.compiler_version,
            &cs.compile_order,
        ]
    }

    /// Returns every table mutably, in canonical [`SECTIONS`] order.
    pub fn tables_mut(&mut self) -> [&mut RelationMap; SECTION_COUNT] {
        let [r0, r1, r2, r3, r4, r5, r6, r7, r8, r9, r10, r11] = self.relations.tables_mut();
        let cs = &mut self.compile_setup;
        [
            r0,
            r1,
            r2,
            r3,
            r4,
            r5,
            r6,
            r7,
            r8,
            r9,
            r10,
            r11,
            &mut self.stamps.products,
            &mut self.stamps.sources,
            &mut self.stamps.binaries,
            &mut self.stamps.classnames,
            &mut self.apis.internal,
            &mut self.apis.external,
            &mut self.source_infos.source_infos,
            &mut self.compilations.compilations,
            &mut cs.output_mode,
            &mut cs.output_dirs,
            &mut cs.compile_options,
            &mut cs.javac_options,
            &mut cs.compiler_version,
            &mut cs.compile_order,
        ]
    }

    /// Pairs every table with its section description.
    pub fn sections(&self) -> impl Iterator<Item = (&'static SectionSpec, &RelationMap)> + '_ {
        SECTIONS.iter().zip(self.tables())
    }

    /// Returns the number of text-format items across all sections.
    pub fn item_count(&self) -> usize {
        self.tables().iter().map(|t| t.pair_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_cover_every_group_in_order() {
        let groups: Vec<_> = SECTIONS.iter().map(|s| s.group).collect();
        assert_eq!(groups.iter().filter(|g| **g == "relations").count(), 12);
        assert_eq!(groups.iter().filter(|g| **g == "stamps").count(), 4);
        assert_eq!(groups.iter().filter(|g| **g == "apis").count(), 2);
        assert_eq!(groups.iter().filter(|g| **g == "source_infos").count(), 1);
        assert_eq!(groups.iter().filter(|g| **g == "compilations").count(), 1);
        assert_eq!(groups.iter().filter(|g| **g == "compile_setup").count(), 6);
        assert_eq!(SECTIONS[0].header, "products");
        assert_eq!(SECTIONS[SECTION_COUNT - 1].header, "compile order");
    }

    #[test]
    fn only_blob_sections_are_block_formatted() {
        let blocks: Vec<_> = SECTIONS
            .iter()
            .filter(|s| s.layout == Layout::Block)
            .map(|s| s.header)
            .collect();
        assert_eq!(
            blocks,
            vec!["internal apis", "external apis", "source infos", "compilations"]
        );
    }

    #[test]
    fn tables_mut_follows_section_order() {
        let mut a = Analysis::new();
        for (i, table) in a.tables_mut().into_iter().enumerate() {
            table.insert(format!("k{i}"), "v");
        }
        assert!(a.relations.src_prod.contains_key("k0"));
        assert!(a.relations.used.contains_key("k11"));
        assert!(a.stamps.classnames.contains_key("k15"));
        assert!(a.apis.external.contains_key("k17"));
        assert!(a.compilations.compilations.contains_key("k19"));
        assert!(a.compile_setup.compile_order.contains_key("k25"));
        assert_eq!(a.item_count(), SECTION_COUNT);
    }

    #[test]
    fn dependency_pair_headers() {
        assert_eq!(
            DependencyKind::Direct.internal_header(),
            "direct source dependencies"
        );
        assert_eq!(
            DependencyKind::Inheritance.internal_header(),
            "inheritance internal dependencies"
        );
    }

    #[test]
    fn compilations_are_dense_and_sorted() {
        let c = Compilations::from_tokens(["200", "100", "200"]);
        let pairs: Vec<_> = c.compilations.pairs().collect();
        assert_eq!(pairs, vec![("000", "100"), ("001", "200")]);
    }

    #[test]
    fn shared_sections_are_keyed_by_binaries_and_outside_classes() {
        let shared: Vec<_> = SECTIONS
            .iter()
            .filter(|s| s.scope == Scope::Shared)
            .map(|s| s.header)
            .collect();
        assert_eq!(shared, vec!["binary stamps", "class names", "external apis"]);
        assert_eq!(SECTIONS[16].scope, Scope::Owned);
    }

    #[test]
    fn class_sources_indexes_declared_classes() {
        let mut r = Relations::default();
        r.classes.insert("a.scala", "A");
        r.classes.insert("a.scala", "A$Inner");
        r.classes.insert("b.scala", "B");
        let index = r.class_sources();
        assert_eq!(index.get("A"), Some(&"a.scala"));
        assert_eq!(index.get("A$Inner"), Some(&"a.scala"));
        assert_eq!(index.get("B"), Some(&"b.scala"));
        assert_eq!(index.get("C"), None);
    }

    #[test]
    fn representative_is_smallest_class() {
        let mut r = Relations::default();
        r.classes.insert("a.scala", "Zeta");
        r.classes.insert("a.scala", "Alpha");
        assert_eq!(r.representative("a.scala"), Some("Alpha"));
        assert_eq!(r.representative("b.scala"), None);
    }

    #[test]
    fn default_analysis_is_empty() {
        let a = Analysis::default();
        assert_eq!(a.item_count(), 0);
        assert_eq!(a.sources().count(), 0);
    }
}
