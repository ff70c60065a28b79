//! Error types for parsing, writing, merging and splitting analyses.

use std::path::PathBuf;

/// Errors produced by analysis operations.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// An I/O error occurred while reading or writing an analysis file.
    #[error("analysis I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The analysis text is malformed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A merge or split was requested with inputs that break its preconditions.
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    /// A redactor could not produce a replacement.
    #[error("redaction failed: {reason}")]
    Redaction {
        /// Description of the failure.
        reason: String,
    },

    /// The JSON export failed.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

/// Convenience alias for results of analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// A malformed-input error raised by the parser.
///
/// Carries the origin of the text (a file path or `<memory>`), the 1-based
/// line number at which the problem was detected and, when known, the header
/// of the section being read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{origin}:{line}: {kind}{}", section_suffix(.section))]
pub struct FormatError {
    /// Where the text came from.
    pub origin: String,
    /// 1-based line number.
    pub line: usize,
    /// Header of the section being parsed, if any.
    pub section: Option<&'static str>,
    /// What went wrong.
    pub kind: FormatErrorKind,
}

fn section_suffix(section: &Option<&'static str>) -> String {
    match section {
        Some(header) => format!(" (in section '{header}')"),
        None => String::new(),
    }
}

/// The specific way in which analysis text is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatErrorKind {
    /// The first line is not a supported format version marker.
    #[error("unsupported format version line '{found}'")]
    UnsupportedVersion {
        /// The line that was found.
        found: String,
    },

    /// A section header was expected but something else was found.
    #[error("expected header '{expected}:', found '{found}'")]
    UnexpectedHeader {
        /// The header expected at this position.
        expected: &'static str,
        /// The line that was found (`<end of input>` at EOF).
        found: String,
    },

    /// The count line is not of the form `<N> items`.
    #[error("malformed item count '{found}'")]
    MalformedCount {
        /// The line that was found.
        found: String,
    },

    /// The declared item count differs from the items actually present.
    #[error("declared {declared} items but found {found}")]
    CountMismatch {
        /// Count from the `<N> items` line.
        declared: usize,
        /// Items actually present.
        found: usize,
    },

    /// Non-blank text follows the last section.
    #[error("unexpected content after the last section: '{found}'")]
    TrailingContent {
        /// The first offending line.
        found: String,
    },

    /// An item line does not contain the ` -> ` separator.
    #[error("missing ' -> ' separator in '{found}'")]
    MissingSeparator {
        /// The offending line.
        found: String,
    },
}

/// A broken precondition of the merge or split engines.
///
/// The inputs were well-formed analyses, but combining or partitioning them
/// as requested would silently lose or corrupt data. Callers can correct the
/// inputs and retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionViolation {
    /// Two merge inputs define the same key in a source-keyed table.
    #[error(
        "analyses {first} and {second} both define '{key}' in section '{section}'; \
         merge inputs must cover disjoint sources"
    )]
    OverlappingKey {
        /// Index of the earlier input.
        first: usize,
        /// Index of the later input.
        second: usize,
        /// Header of the section holding the key.
        section: &'static str,
        /// The colliding key.
        key: String,
    },

    /// A source file appears in more than one split partition.
    #[error("source '{source_file}' appears in partitions {first} and {second}")]
    OverlappingPartitions {
        /// Index of the earlier partition.
        first: usize,
        /// Index of the later partition.
        second: usize,
        /// The source listed twice.
        source_file: String,
    },

    /// An edge must be externalized to a source that declares no classes.
    #[error(
        "cannot externalize dependency of '{dependent}' on '{source_file}' \
         in section '{section}': '{source_file}' declares no classes"
    )]
    NoRepresentative {
        /// The source without classes.
        source_file: String,
        /// The source whose edge needed externalizing.
        dependent: String,
        /// Header of the internal dependency section.
        section: &'static str,
    },
}
