//! [`Analysis`] → text writer.
//!
//! Output is canonical: sections in [`SECTIONS`](crate::analysis::SECTIONS)
//! order, items sorted, one item per `(key, value)` pair. Two structurally
//! equal analyses always serialize to the same bytes.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::{Analysis, Layout, SectionSpec};
use crate::error::{AnalysisError, AnalysisResult};
use crate::parser::{FORMAT_VERSION_LINE, SEPARATOR};
use crate::relation_map::RelationMap;

/// A substring rewrite applied to every written item.
///
/// With `to = None` the rule rewrites to absence: any item containing `from`
/// is dropped instead of being written with a partial value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebasing {
    /// Text to look for.
    pub from: String,
    /// Replacement, or `None` to drop matching items.
    pub to: Option<String>,
}

impl Rebasing {
    /// A rule replacing every occurrence of `from` with `to`.
    pub fn replace(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: Some(to.into()),
        }
    }

    /// A rule dropping every item that mentions `from`.
    pub fn discard(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: None,
        }
    }
}

/// Applies `rebasings` in order. Returns `None` if the item must be dropped.
fn rebase(item: String, rebasings: &[Rebasing]) -> Option<String> {
    let mut item = item;
    for rule in rebasings {
        if rule.from.is_empty() {
            continue;
        }
        match &rule.to {
            None if item.contains(&rule.from) => return None,
            None => {}
            Some(to) => item = item.replace(&rule.from, to),
        }
    }
    Some(item)
}

/// Formats, rebases and sorts the items of one section.
fn section_items(spec: &SectionSpec, table: &RelationMap, rebasings: &[Rebasing]) -> Vec<String> {
    let mut items: Vec<String> = table
        .pairs()
        .filter_map(|(k, v)| {
            let item = match spec.layout {
                Layout::Inline => format!("{k}{SEPARATOR}{v}"),
                Layout::Block => format!("{k}{SEPARATOR}\n{v}"),
            };
            rebase(item, rebasings)
        })
        .collect();
    items.sort();
    items
}

/// Writes `analysis` to `out` in the text format.
pub fn write_to<W: Write>(analysis: &Analysis, mut out: W, rebasings: &[Rebasing]) -> std::io::Result<()> {
    writeln!(out, "{FORMAT_VERSION_LINE}")?;
    for (spec, table) in analysis.sections() {
        let items = section_items(spec, table, rebasings);
        writeln!(out, "{}:", spec.header)?;
        writeln!(out, "{} items", items.len())?;
        for item in &items {
            writeln!(out, "{item}")?;
        }
    }
    out.flush()
}

/// Renders `analysis` as text.
pub fn to_text(analysis: &Analysis, rebasings: &[Rebasing]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_to(analysis, &mut buf, rebasings);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Writes `analysis` to `path`.
///
/// The text is first written to a temporary file next to `path` and renamed
/// into place once complete, so `path` either holds the whole analysis or is
/// left as it was. Parent directories are created as needed.
pub fn write_path(analysis: &Analysis, path: &Path, rebasings: &[Rebasing]) -> AnalysisResult<()> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| AnalysisError::Io { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }

    let tmp = temp_path_for(path);
    let result = std::fs::File::create(&tmp)
        .and_then(|file| {
            let mut out = std::io::BufWriter::new(file);
            write_to(analysis, &mut out, rebasings)?;
            let file = out.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()
        })
        .map_err(io_err(tmp.as_path()))
        .and_then(|()| std::fs::rename(&tmp, path).map_err(io_err(path)));

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result?;

    tracing::debug!(
        path = %path.display(),
        items = analysis.item_count(),
        "wrote analysis"
    );
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".tmp.{}", std::process::id()));
    path.with_file_name(name)
}
