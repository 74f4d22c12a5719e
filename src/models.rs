//! Result shapes produced by a collection run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::RawMap;

/// Column value kinds a source may declare for its result fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Text,
    /// Binary data carried as a string.
    Binary,
    Float,
    /// Opaque values that cannot be processed further; rendered as strings.
    Any,
}

impl ColumnType {
    /// Look up a declared column type tag.
    pub fn from_tag(tag: &str) -> Option<ColumnType> {
        match tag {
            "int" => Some(ColumnType::Int),
            "text" => Some(ColumnType::Text),
            "binary" => Some(ColumnType::Binary),
            "float" => Some(ColumnType::Float),
            "any" => Some(ColumnType::Any),
            _ => None,
        }
    }

    /// Coerce a raw value to this column's semantic type. Values that cannot
    /// be represented in the declared type pass through unchanged.
    pub fn coerce(self, value: &Value) -> Value {
        match self {
            ColumnType::Int => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => value.clone(),
                Value::Number(n) => n
                    .as_f64()
                    .map(|f| Value::from(f as i64))
                    .unwrap_or_else(|| value.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| value.clone()),
                _ => value.clone(),
            },
            ColumnType::Float => match value {
                Value::Number(n) => n
                    .as_f64()
                    .map(Value::from)
                    .unwrap_or_else(|| value.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| value.clone()),
                _ => value.clone(),
            },
            ColumnType::Text | ColumnType::Binary | ColumnType::Any => match value {
                Value::String(_) => value.clone(),
                other => Value::String(other.to_string()),
            },
        }
    }
}

/// One column of an [`ArtifactResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

/// All rows produced by one source invocation.
///
/// Serializes to the canonical export shape
/// `{artifact_name, result_type, fields, results}` losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactResult {
    pub artifact_name: String,
    pub result_type: String,
    pub fields: Vec<ColumnSpec>,
    pub results: Vec<RawMap>,
}

impl ArtifactResult {
    pub fn new(
        artifact_name: impl Into<String>,
        result_type: impl Into<String>,
        fields: Vec<ColumnSpec>,
    ) -> Self {
        ArtifactResult {
            artifact_name: artifact_name.into(),
            result_type: result_type.into(),
            fields,
            results: Vec::new(),
        }
    }

    /// Append one row; empty rows are dropped.
    pub fn add_result(&mut self, row: RawMap) {
        if !row.is_empty() {
            self.results.push(row);
        }
    }
}

/// One item of the collection output stream: either a divider marking the
/// start of an artifact's block, or a result bundle from one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputRow {
    Divider { divider: String },
    Result { result: ArtifactResult },
}
