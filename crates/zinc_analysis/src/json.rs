//! JSON export of an analysis, for inspection and debugging.

use serde_json::{Map, Value};

use crate::analysis::Analysis;
use crate::error::{AnalysisError, AnalysisResult};

/// Renders `analysis` as pretty-printed JSON.
///
/// The top-level object has one member per group (`relations`, `stamps`,
/// `apis`, `source_infos`, `compilations`, `compile_setup`). Each group maps
/// section headers to `{ key: [values...] }` objects. All keys and values are
/// sorted. The output is diagnostic only; it is never parsed back.
pub fn to_json(analysis: &Analysis) -> AnalysisResult<String> {
    let mut groups = Map::new();
    for (spec, table) in analysis.sections() {
        let value = serde_json::to_value(table).map_err(serialization_error)?;
        if let Value::Object(sections) = groups
            .entry(spec.group)
            .or_insert_with(|| Value::Object(Map::new()))
        {
            sections.insert(spec.header.to_string(), value);
        }
    }
    serde_json::to_string_pretty(&Value::Object(groups)).map_err(serialization_error)
}

fn serialization_error(e: serde_json::Error) -> AnalysisError {
    AnalysisError::Serialization {
        reason: e.to_string(),
    }
}
