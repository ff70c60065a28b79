//! Text → [`Analysis`] parser.
//!
//! The format is strictly positional: a version line followed by the 26
//! sections of [`SECTIONS`] in order. Each section is a `<header>:` line, an
//! `<N> items` line and N items. Inline items are `key -> value`; block items
//! are a `key -> ` line followed by a value line.

use std::path::Path;

use crate::analysis::{Analysis, Layout, SectionSpec, SECTIONS};
use crate::error::{AnalysisError, AnalysisResult, FormatError, FormatErrorKind};
use crate::relation_map::RelationMap;

/// The only format version line this crate reads and writes.
pub const FORMAT_VERSION_LINE: &str = "format version: 4";

/// Separator between key and value in an item.
pub(crate) const SEPARATOR: &str = " -> ";

/// Origin reported for text that did not come from a file.
pub const MEMORY_ORIGIN: &str = "<memory>";

/// Reads and parses the analysis file at `path`.
pub fn parse_path(path: &Path) -> AnalysisResult<Analysis> {
    let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let analysis = parse_str(&text, &path.display().to_string())?;
    tracing::debug!(
        path = %path.display(),
        sources = analysis.stamps.sources.len(),
        items = analysis.item_count(),
        "parsed analysis"
    );
    Ok(analysis)
}

/// Parses analysis text. `origin` names the text in error messages.
pub fn parse_str(text: &str, origin: &str) -> Result<Analysis, FormatError> {
    let mut parser = Parser::new(text, origin);
    parser.expect_version()?;
    let mut analysis = Analysis::new();
    for (index, (spec, table)) in SECTIONS.iter().zip(analysis.tables_mut()).enumerate() {
        let next = SECTIONS.get(index + 1).map(|s| s.header);
        parser.read_section(spec, next, table)?;
    }
    parser.expect_end()?;
    Ok(analysis)
}

/// Line cursor over the input with error construction helpers.
struct Parser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    origin: &'a str,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, origin: &'a str) -> Self {
        let lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        Self {
            lines,
            pos: 0,
            origin,
        }
    }

    /// Returns the next line without consuming it.
    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    /// Line number (1-based) of the line at `pos`.
    fn line_number(&self) -> usize {
        self.pos + 1
    }

    fn error(&self, line: usize, section: Option<&'static str>, kind: FormatErrorKind) -> FormatError {
        FormatError {
            origin: self.origin.to_string(),
            line,
            section,
            kind,
        }
    }

    fn expect_version(&mut self) -> Result<(), FormatError> {
        let line = self.line_number();
        match self.next_line() {
            Some(FORMAT_VERSION_LINE) => Ok(()),
            other => Err(self.error(
                line,
                None,
                FormatErrorKind::UnsupportedVersion {
                    found: other.unwrap_or_default().to_string(),
                },
            )),
        }
    }

    fn read_section(
        &mut self,
        spec: &SectionSpec,
        next_header: Option<&'static str>,
        table: &mut RelationMap,
    ) -> Result<(), FormatError> {
        let header = spec.header;
        let line = self.line_number();
        match self.next_line() {
            Some(found) if found.strip_suffix(':') == Some(header) => {}
            found => {
                return Err(self.error(
                    line,
                    Some(header),
                    FormatErrorKind::UnexpectedHeader {
                        expected: header,
                        found: found.unwrap_or("<end of input>").to_string(),
                    },
                ))
            }
        }

        let declared = self.read_count(header)?;
        for found in 0..declared {
            let exhausted = match self.peek() {
                None => true,
                Some(l) if self.pos + 1 == self.lines.len() => l.trim().is_empty(),
                Some(l) if next_header.is_none() => l.trim().is_empty(),
                Some(l) => is_header_line(l, next_header) && !l.contains(SEPARATOR),
            };
            if exhausted {
                return Err(self.error(
                    self.line_number(),
                    Some(header),
                    FormatErrorKind::CountMismatch { declared, found },
                ));
            }
            let (key, value) = match spec.layout {
                Layout::Inline => self.read_inline_item(header)?,
                Layout::Block => self.read_block_item(header, declared, found)?,
            };
            table.insert(key, value);
        }

        self.check_no_surplus(header, declared, next_header)
    }

    fn read_count(&mut self, header: &'static str) -> Result<usize, FormatError> {
        let line = self.line_number();
        let found = self.next_line().unwrap_or_default();
        found
            .strip_suffix(" items")
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| {
                self.error(
                    line,
                    Some(header),
                    FormatErrorKind::MalformedCount {
                        found: found.to_string(),
                    },
                )
            })
    }

    fn read_inline_item(&mut self, header: &'static str) -> Result<(&'a str, &'a str), FormatError> {
        let line = self.line_number();
        let text = self.next_line().unwrap_or_default();
        text.split_once(SEPARATOR).ok_or_else(|| {
            self.error(
                line,
                Some(header),
                FormatErrorKind::MissingSeparator {
                    found: text.to_string(),
                },
            )
        })
    }

    fn read_block_item(
        &mut self,
        header: &'static str,
        declared: usize,
        found: usize,
    ) -> Result<(&'a str, &'a str), FormatError> {
        let line = self.line_number();
        let text = self.next_line().unwrap_or_default();
        let key = text
            .strip_suffix(SEPARATOR)
            .or_else(|| text.strip_suffix(SEPARATOR.trim_end()))
            .ok_or_else(|| {
                self.error(
                    line,
                    Some(header),
                    FormatErrorKind::MissingSeparator {
                        found: text.to_string(),
                    },
                )
            })?;
        let value_line = self.line_number();
        let value = self.next_line().ok_or_else(|| {
            self.error(
                value_line,
                Some(header),
                FormatErrorKind::CountMismatch { declared, found },
            )
        })?;
        Ok((key, value))
    }

    /// After reading `declared` items, the next line must start the next
    /// section (or end the input). Anything that still looks like an item
    /// means the count line undercounted.
    fn check_no_surplus(
        &self,
        header: &'static str,
        declared: usize,
        next_header: Option<&'static str>,
    ) -> Result<(), FormatError> {
        let mut surplus = 0;
        let mut probe = self.pos;
        while let Some(line) = self.lines.get(probe) {
            if is_header_line(line, next_header) || (next_header.is_none() && line.is_empty()) {
                break;
            }
            if !line.contains(SEPARATOR.trim_end()) {
                break;
            }
            surplus += 1;
            probe += 1;
        }
        if surplus > 0 {
            return Err(self.error(
                self.line_number(),
                Some(header),
                FormatErrorKind::CountMismatch {
                    declared,
                    found: declared + surplus,
                },
            ));
        }
        Ok(())
    }

    /// Only blank lines may follow the last section.
    fn expect_end(&mut self) -> Result<(), FormatError> {
        while let Some(line) = self.peek() {
            if !line.trim().is_empty() {
                return Err(self.error(
                    self.line_number(),
                    None,
                    FormatErrorKind::TrailingContent {
                        found: line.to_string(),
                    },
                ));
            }
            self.pos += 1;
        }
        Ok(())
    }
}

fn is_header_line(line: &str, header: Option<&str>) -> bool {
    match header {
        Some(h) => line.strip_suffix(':') == Some(h),
        None => false,
    }
}
