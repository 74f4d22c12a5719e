//! Source variants: the concrete ways an artifact collects data.
//!
//! A source is built from one `sources` entry of a definition, a mapping of
//! `{type, attributes}`. The `type` tag selects the variant through a fixed
//! registration table; tags outside the table are a recognized non-fatal
//! outcome recorded by the enclosing definition, not a dispatch failure.

use lazy_static::lazy_static;
use serde_json::Value;

use crate::collectors::{Collector, RowStream};
use crate::constants::{
    FILE_INFORMATION, TYPE_INDICATOR_ARTIFACT_GROUP, TYPE_INDICATOR_FILE, TYPE_INDICATOR_QUERY,
};
use crate::definitions::Platform;
use crate::errors::{CollectError, FormatError, SchemaError};
use crate::models::{ArtifactResult, ColumnSpec, ColumnType, OutputRow};
use crate::schema::{self, empty_list, Bind, FieldSpec, RawMap, ValueKind};

fn default_supported_os() -> Value {
    Value::Array(
        Platform::ALL
            .iter()
            .map(|p| Value::String(p.as_str().to_string()))
            .collect(),
    )
}

fn default_separator() -> Value {
    Value::String("/".to_string())
}

/// Source backed by the injected query-execution capability.
#[derive(Debug, Clone, Default)]
pub struct QuerySource {
    pub query: String,
    pub query_parameters: Vec<Value>,
    pub fields: Vec<ColumnSpec>,
    pub type_name: String,
    pub supported_os: Vec<String>,
}

fn store_query(s: &mut QuerySource, v: Value) -> Result<(), SchemaError> {
    s.query = schema::into_string(v, "query")?;
    Ok(())
}

fn store_query_parameters(s: &mut QuerySource, v: Value) -> Result<(), SchemaError> {
    s.query_parameters = schema::into_list(v, "query_parameters")?;
    Ok(())
}

fn store_columns(s: &mut QuerySource, v: Value) -> Result<(), SchemaError> {
    for entry in schema::into_list(v, "fields")? {
        let column = entry.as_object().ok_or(SchemaError::IncompleteColumn)?;
        let (name, tag) = match (
            column.get("name").and_then(Value::as_str),
            column.get("type").and_then(Value::as_str),
        ) {
            (Some(name), Some(tag)) => (name, tag),
            _ => return Err(SchemaError::IncompleteColumn),
        };
        let kind = ColumnType::from_tag(tag)
            .ok_or_else(|| SchemaError::UnsupportedColumnType(tag.to_string()))?;
        s.fields.push(ColumnSpec { name: name.to_string(), kind });
    }
    Ok(())
}

fn store_type_name(s: &mut QuerySource, v: Value) -> Result<(), SchemaError> {
    s.type_name = schema::into_string(v, "type_name")?;
    Ok(())
}

fn store_query_supported_os(s: &mut QuerySource, v: Value) -> Result<(), SchemaError> {
    s.supported_os = schema::into_string_list(v, "supported_os")?;
    Ok(())
}

const QUERY_FIELDS: &[FieldSpec<QuerySource>] = &[
    FieldSpec {
        name: "query",
        kind: Some(ValueKind::Str),
        default: None,
        optional: false,
        bind: Bind::Store(store_query),
    },
    FieldSpec {
        name: "query_parameters",
        kind: None,
        default: Some(empty_list),
        optional: true,
        bind: Bind::Store(store_query_parameters),
    },
    FieldSpec {
        name: "fields",
        kind: Some(ValueKind::List),
        default: None,
        optional: false,
        bind: Bind::Store(store_columns),
    },
    FieldSpec {
        name: "type_name",
        kind: Some(ValueKind::Str),
        default: None,
        optional: false,
        bind: Bind::Store(store_type_name),
    },
    FieldSpec {
        name: "supported_os",
        kind: None,
        default: Some(default_supported_os),
        optional: true,
        bind: Bind::Store(store_query_supported_os),
    },
];

impl QuerySource {
    fn build(attributes: &RawMap) -> Result<Source, FormatError> {
        let mut source = QuerySource::default();
        schema::validate_fields(&mut source, QUERY_FIELDS, attributes)?;
        Ok(Source::Query(source))
    }

    fn apply<'c>(&'c self, artifact_name: &str, collector: &'c Collector) -> RowStream<'c> {
        let artifact_name = artifact_name.to_string();
        Box::new(std::iter::once_with(move || -> Result<OutputRow, CollectError> {
            let mut result =
                ArtifactResult::new(artifact_name, self.type_name.clone(), self.fields.clone());
            let matches = collector
                .capabilities()
                .query
                .execute(&self.query, &self.query_parameters)?;
            for matched in matches {
                let mut row = RawMap::new();
                for column in &self.fields {
                    match matched.get(&column.name) {
                        Some(value) if !value.is_null() => {
                            row.insert(column.name.clone(), column.kind.coerce(value));
                        }
                        _ => {}
                    }
                }
                result.add_result(row);
            }
            Ok(OutputRow::Result { result })
        }))
    }
}

/// Source that expands path patterns through the filesystem capability.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    pub paths: Vec<String>,
    pub separator: String,
    pub supported_os: Vec<String>,
}

lazy_static! {
    /// Columns reported for every matched file.
    static ref FILE_INFO_COLUMNS: Vec<ColumnSpec> = vec![
        ColumnSpec { name: "st_mode".into(), kind: ColumnType::Text },
        ColumnSpec { name: "st_nlink".into(), kind: ColumnType::Int },
        ColumnSpec { name: "st_uid".into(), kind: ColumnType::Text },
        ColumnSpec { name: "st_gid".into(), kind: ColumnType::Text },
        ColumnSpec { name: "st_size".into(), kind: ColumnType::Int },
        ColumnSpec { name: "st_mtime".into(), kind: ColumnType::Text },
        ColumnSpec { name: "filename".into(), kind: ColumnType::Text },
    ];
}

fn store_paths(s: &mut FileSource, v: Value) -> Result<(), SchemaError> {
    s.paths = schema::into_string_list(v, "paths")?;
    Ok(())
}

fn store_separator(s: &mut FileSource, v: Value) -> Result<(), SchemaError> {
    s.separator = schema::into_string(v, "separator")?;
    Ok(())
}

fn store_file_supported_os(s: &mut FileSource, v: Value) -> Result<(), SchemaError> {
    s.supported_os = schema::into_string_list(v, "supported_os")?;
    Ok(())
}

const FILE_FIELDS: &[FieldSpec<FileSource>] = &[
    FieldSpec {
        name: "paths",
        kind: None,
        default: Some(empty_list),
        optional: false,
        bind: Bind::Store(store_paths),
    },
    FieldSpec {
        name: "separator",
        kind: Some(ValueKind::Str),
        default: Some(default_separator),
        optional: true,
        bind: Bind::Store(store_separator),
    },
    FieldSpec {
        name: "supported_os",
        kind: None,
        default: Some(default_supported_os),
        optional: true,
        bind: Bind::Store(store_file_supported_os),
    },
];

impl FileSource {
    fn build(attributes: &RawMap) -> Result<Source, FormatError> {
        let mut source = FileSource::default();
        schema::validate_fields(&mut source, FILE_FIELDS, attributes)?;
        Ok(Source::File(source))
    }

    fn apply<'c>(&'c self, artifact_name: &str, collector: &'c Collector) -> RowStream<'c> {
        let artifact_name = artifact_name.to_string();
        Box::new(std::iter::once_with(move || -> Result<OutputRow, CollectError> {
            let mut result =
                ArtifactResult::new(artifact_name, FILE_INFORMATION, FILE_INFO_COLUMNS.clone());
            let hits = collector.capabilities().filesystem.glob(&self.paths)?;
            for entry in hits {
                let raw = entry.into_row();
                let mut row = RawMap::new();
                for column in FILE_INFO_COLUMNS.iter() {
                    if let Some(value) = raw.get(&column.name) {
                        row.insert(column.name.clone(), column.kind.coerce(value));
                    }
                }
                result.add_result(row);
            }
            Ok(OutputRow::Result { result })
        }))
    }
}

/// Source defined purely as references to other artifacts.
#[derive(Debug, Clone, Default)]
pub struct GroupSource {
    pub names: Vec<String>,
    pub supported_os: Vec<String>,
}

fn store_names(s: &mut GroupSource, v: Value) -> Result<(), SchemaError> {
    s.names = schema::into_string_list(v, "names")?;
    Ok(())
}

fn store_group_supported_os(s: &mut GroupSource, v: Value) -> Result<(), SchemaError> {
    s.supported_os = schema::into_string_list(v, "supported_os")?;
    Ok(())
}

const GROUP_FIELDS: &[FieldSpec<GroupSource>] = &[
    FieldSpec {
        name: "names",
        kind: Some(ValueKind::List),
        default: None,
        optional: false,
        bind: Bind::Store(store_names),
    },
    FieldSpec {
        name: "supported_os",
        kind: None,
        default: Some(default_supported_os),
        optional: true,
        bind: Bind::Store(store_group_supported_os),
    },
];

impl GroupSource {
    fn build(attributes: &RawMap) -> Result<Source, FormatError> {
        let mut source = GroupSource::default();
        schema::validate_fields(&mut source, GROUP_FIELDS, attributes)?;
        Ok(Source::Group(source))
    }

    // The sole recursion point of the whole engine: each referenced artifact
    // expands through the collector, which guards against revisits.
    fn apply<'c>(&'c self, collector: &'c Collector) -> RowStream<'c> {
        Box::new(
            self.names
                .iter()
                .flat_map(move |name| collector.collect_artifact(name)),
        )
    }
}

/// One concrete collection method attached to an artifact.
#[derive(Debug, Clone)]
pub enum Source {
    Query(QuerySource),
    File(FileSource),
    Group(GroupSource),
}

type SourceBuilder = fn(&RawMap) -> Result<Source, FormatError>;

/// Registration table mapping source type tags to variant constructors.
const SOURCE_TYPES: &[(&str, SourceBuilder)] = &[
    (TYPE_INDICATOR_QUERY, QuerySource::build),
    (TYPE_INDICATOR_FILE, FileSource::build),
    (TYPE_INDICATOR_ARTIFACT_GROUP, GroupSource::build),
];

impl Source {
    /// Build a source from one `sources` entry. `Ok(None)` marks a tag with
    /// no registered implementation; the caller records it as unsupported.
    pub fn from_value(raw: &Value) -> Result<Option<Source>, FormatError> {
        let entry = raw.as_object().ok_or(FormatError::SourceNotAMapping)?;
        let tag = entry
            .get("type")
            .and_then(Value::as_str)
            .ok_or(FormatError::SourceWithoutType)?;
        let Some((_, build)) = SOURCE_TYPES.iter().find(|(known, _)| *known == tag) else {
            return Ok(None);
        };
        let attributes = entry
            .get("attributes")
            .and_then(Value::as_object)
            .ok_or(FormatError::SourceWithoutAttributes)?;
        build(attributes).map(Some)
    }

    /// The tag this source was registered under.
    pub fn type_indicator(&self) -> &'static str {
        match self {
            Source::Query(_) => TYPE_INDICATOR_QUERY,
            Source::File(_) => TYPE_INDICATOR_FILE,
            Source::Group(_) => TYPE_INDICATOR_ARTIFACT_GROUP,
        }
    }

    pub fn supported_os(&self) -> &[String] {
        match self {
            Source::Query(s) => &s.supported_os,
            Source::File(s) => &s.supported_os,
            Source::Group(s) => &s.supported_os,
        }
    }

    /// Whether this source declares support for `platform`.
    pub fn supports(&self, platform: Platform) -> bool {
        self.supported_os().iter().any(|os| os == platform.as_str())
    }

    /// Produce this source's slice of the output stream. Nothing runs until
    /// the consumer pulls.
    pub fn apply<'c>(&'c self, artifact_name: &str, collector: &'c Collector) -> RowStream<'c> {
        match self {
            Source::Query(source) => source.apply(artifact_name, collector),
            Source::File(source) => source.apply(artifact_name, collector),
            Source::Group(source) => source.apply(collector),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_source_builds_from_attributes() {
        let raw = json!({
            "type": "engine-query",
            "attributes": {
                "query": "select * from users",
                "fields": [
                    {"name": "username", "type": "text"},
                    {"name": "uid", "type": "int"},
                ],
                "type_name": "user_account",
            }
        });
        let source = Source::from_value(&raw).unwrap().unwrap();
        let Source::Query(query) = &source else {
            panic!("expected a query source");
        };
        assert_eq!(query.query, "select * from users");
        assert_eq!(query.fields.len(), 2);
        assert!(query.query_parameters.is_empty());
        assert_eq!(source.type_indicator(), TYPE_INDICATOR_QUERY);
        // Sources default to every platform.
        assert_eq!(query.supported_os.len(), Platform::ALL.len());
    }

    #[test]
    fn query_source_requires_query() {
        let raw = json!({
            "type": "engine-query",
            "attributes": {"fields": [], "type_name": "t"}
        });
        let err = Source::from_value(&raw).unwrap_err();
        assert_eq!(err, FormatError::Schema(SchemaError::MissingField("query")));
    }

    #[test]
    fn unknown_column_type_fails_construction() {
        let raw = json!({
            "type": "engine-query",
            "attributes": {
                "query": "q",
                "fields": [{"name": "when", "type": "datetime"}],
                "type_name": "t",
            }
        });
        let err = Source::from_value(&raw).unwrap_err();
        assert_eq!(
            err,
            FormatError::Schema(SchemaError::UnsupportedColumnType("datetime".into()))
        );
    }

    #[test]
    fn column_without_name_fails_construction() {
        let raw = json!({
            "type": "engine-query",
            "attributes": {
                "query": "q",
                "fields": [{"type": "int"}],
                "type_name": "t",
            }
        });
        let err = Source::from_value(&raw).unwrap_err();
        assert_eq!(err, FormatError::Schema(SchemaError::IncompleteColumn));
    }

    #[test]
    fn file_source_defaults() {
        let raw = json!({"type": "file", "attributes": {"paths": []}});
        let Source::File(file) = Source::from_value(&raw).unwrap().unwrap() else {
            panic!("expected a file source");
        };
        assert!(file.paths.is_empty());
        assert_eq!(file.separator, "/");
        assert_eq!(file.supported_os, vec!["Linux", "Windows", "Darwin"]);
    }

    #[test]
    fn file_source_requires_paths_key() {
        let raw = json!({"type": "file", "attributes": {}});
        let err = Source::from_value(&raw).unwrap_err();
        assert_eq!(err, FormatError::Schema(SchemaError::MissingField("paths")));
    }

    #[test]
    fn group_source_requires_names() {
        let raw = json!({"type": "artifact-group", "attributes": {}});
        let err = Source::from_value(&raw).unwrap_err();
        assert_eq!(err, FormatError::Schema(SchemaError::MissingField("names")));
    }

    #[test]
    fn unknown_tag_is_not_an_error() {
        let raw = json!({"type": "REGISTRY_KEY", "attributes": {}});
        assert!(Source::from_value(&raw).unwrap().is_none());
    }

    #[test]
    fn source_without_type_fails() {
        let raw = json!({"attributes": {}});
        let err = Source::from_value(&raw).unwrap_err();
        assert_eq!(err, FormatError::SourceWithoutType);
    }

    #[test]
    fn source_without_attributes_fails() {
        let raw = json!({"type": "file"});
        let err = Source::from_value(&raw).unwrap_err();
        assert_eq!(err, FormatError::SourceWithoutAttributes);
    }

    #[test]
    fn platform_support_checks_tag_strings() {
        let raw = json!({
            "type": "file",
            "attributes": {"paths": [], "supported_os": ["Linux"]}
        });
        let source = Source::from_value(&raw).unwrap().unwrap();
        assert!(source.supports(Platform::Linux));
        assert!(!source.supports(Platform::Windows));
    }
}
