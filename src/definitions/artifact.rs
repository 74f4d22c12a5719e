//! Validated artifact definitions.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::constants::{LABELS, TOP_LEVEL_KEYS};
use crate::definitions::{Platform, Source};
use crate::errors::{FormatError, SchemaError};
use crate::schema::{self, empty_list, Bind, FieldSpec, RawMap, ValueKind};

/// A named, validated bundle of collection sources and metadata.
///
/// Built once from a raw mapping at registry load time and never mutated
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct ArtifactDefinition {
    pub name: String,
    pub doc: String,
    pub labels: Vec<String>,
    /// Labels outside the known vocabulary, kept for strict coverage checks.
    pub undefined_labels: BTreeSet<String>,
    pub sources: Vec<Source>,
    /// Type tags of declared sources with no registered implementation.
    pub unsupported_source_types: Vec<String>,
    pub supported_os: BTreeSet<Platform>,
    /// Opaque predicate descriptors; stored verbatim, never evaluated here.
    pub conditions: Vec<Value>,
    pub returned_types: Vec<String>,
    pub provides: Vec<String>,
    pub urls: Vec<String>,
}

fn store_name(d: &mut ArtifactDefinition, v: Value) -> Result<(), SchemaError> {
    d.name = schema::into_string(v, "name")?;
    Ok(())
}

fn store_doc(d: &mut ArtifactDefinition, v: Value) -> Result<(), SchemaError> {
    d.doc = schema::into_string(v, "doc")?;
    Ok(())
}

// Unknown labels are kept so users can extend the vocabulary, but they are
// recorded separately for callers that need strict coverage.
fn check_labels(d: &mut ArtifactDefinition, raw: &RawMap) -> Result<(), FormatError> {
    let labels = match raw.get("labels") {
        Some(value) => schema::into_string_list(value.clone(), "labels")?,
        None => Vec::new(),
    };
    d.undefined_labels = labels
        .iter()
        .filter(|label| !LABELS.contains(&label.as_str()))
        .cloned()
        .collect();
    d.labels = labels;
    Ok(())
}

fn build_sources(d: &mut ArtifactDefinition, raw: &RawMap) -> Result<(), FormatError> {
    // Presence and list-ness were already enforced by the field table.
    let entries = raw.get("sources").and_then(Value::as_array).cloned().unwrap_or_default();
    for entry in &entries {
        match Source::from_value(entry)? {
            Some(source) => d.sources.push(source),
            None => {
                let tag = entry.get("type").and_then(Value::as_str).unwrap_or_default();
                d.unsupported_source_types.push(tag.to_string());
            }
        }
    }
    if d.sources.is_empty() {
        if !d.unsupported_source_types.is_empty() {
            return Err(FormatError::NoSupportedSources(
                d.unsupported_source_types.clone(),
            ));
        }
        return Err(FormatError::NoSources);
    }
    Ok(())
}

fn check_supported_os(d: &mut ArtifactDefinition, raw: &RawMap) -> Result<(), FormatError> {
    let declared = match raw.get("supported_os") {
        Some(value) => schema::into_string_list(value.clone(), "supported_os")?,
        None => Platform::ALL.iter().map(|p| p.as_str().to_string()).collect(),
    };
    let mut undefined = Vec::new();
    for name in &declared {
        match Platform::from_name(name) {
            Some(platform) => {
                d.supported_os.insert(platform);
            }
            None => undefined.push(name.clone()),
        }
    }
    if !undefined.is_empty() {
        return Err(FormatError::UndefinedSupportedOs(undefined));
    }
    Ok(())
}

fn store_conditions(d: &mut ArtifactDefinition, v: Value) -> Result<(), SchemaError> {
    d.conditions = schema::into_list(v, "conditions")?;
    Ok(())
}

fn store_returned_types(d: &mut ArtifactDefinition, v: Value) -> Result<(), SchemaError> {
    d.returned_types = schema::into_string_list(v, "returned_types")?;
    Ok(())
}

fn store_provides(d: &mut ArtifactDefinition, v: Value) -> Result<(), SchemaError> {
    d.provides = schema::into_string_list(v, "provides")?;
    Ok(())
}

fn store_urls(d: &mut ArtifactDefinition, v: Value) -> Result<(), SchemaError> {
    d.urls = schema::into_string_list(v, "urls")?;
    Ok(())
}

const ARTIFACT_FIELDS: &[FieldSpec<ArtifactDefinition>] = &[
    FieldSpec {
        name: "name",
        kind: Some(ValueKind::Str),
        default: None,
        optional: false,
        bind: Bind::Store(store_name),
    },
    FieldSpec {
        name: "doc",
        kind: Some(ValueKind::Str),
        default: None,
        optional: false,
        bind: Bind::Store(store_doc),
    },
    FieldSpec {
        name: "labels",
        kind: None,
        default: Some(empty_list),
        optional: true,
        bind: Bind::Derive(check_labels),
    },
    FieldSpec {
        name: "sources",
        kind: None,
        default: Some(empty_list),
        optional: false,
        bind: Bind::Derive(build_sources),
    },
    FieldSpec {
        name: "supported_os",
        kind: None,
        default: None,
        optional: true,
        bind: Bind::Derive(check_supported_os),
    },
    FieldSpec {
        name: "conditions",
        kind: None,
        default: Some(empty_list),
        optional: true,
        bind: Bind::Store(store_conditions),
    },
    FieldSpec {
        name: "returned_types",
        kind: None,
        default: Some(empty_list),
        optional: true,
        bind: Bind::Store(store_returned_types),
    },
    FieldSpec {
        name: "provides",
        kind: Some(ValueKind::List),
        default: None,
        optional: true,
        bind: Bind::Store(store_provides),
    },
    FieldSpec {
        name: "urls",
        kind: Some(ValueKind::List),
        default: None,
        optional: true,
        bind: Bind::Store(store_urls),
    },
];

impl ArtifactDefinition {
    /// Validate a raw definition mapping. Failures carry the definition name
    /// so bulk loads can report which document was dropped.
    pub fn from_value(raw: &Value) -> Result<Self, FormatError> {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        Self::load(raw).map_err(|e| FormatError::Definition { name, source: Box::new(e) })
    }

    fn load(raw: &Value) -> Result<Self, FormatError> {
        let map = raw.as_object().ok_or(FormatError::NotAMapping)?;
        let undefined: Vec<String> = map
            .keys()
            .filter(|key| !TOP_LEVEL_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !undefined.is_empty() {
            return Err(FormatError::UndefinedKeys(undefined));
        }
        let mut definition = ArtifactDefinition::default();
        schema::validate_fields(&mut definition, ARTIFACT_FIELDS, map)?;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal(extra: Value) -> Value {
        let mut base = json!({
            "name": "TestArtifact",
            "doc": "A test artifact.",
            "sources": [{"type": "file", "attributes": {"paths": ["/etc/passwd"]}}],
        });
        base.as_object_mut()
            .unwrap()
            .extend(extra.as_object().cloned().unwrap_or_default());
        base
    }

    #[test]
    fn loads_minimal_definition() {
        let definition = ArtifactDefinition::from_value(&minimal(json!({}))).unwrap();
        assert_eq!(definition.name, "TestArtifact");
        assert_eq!(definition.sources.len(), 1);
        assert!(definition.labels.is_empty());
        assert!(definition.conditions.is_empty());
        // No supported_os means every platform.
        assert_eq!(definition.supported_os.len(), Platform::ALL.len());
    }

    #[test]
    fn unknown_top_level_key_fails() {
        let raw = minimal(json!({"author": "nobody"}));
        let err = ArtifactDefinition::from_value(&raw).unwrap_err();
        let FormatError::Definition { name, source } = err else {
            panic!("expected a wrapped error");
        };
        assert_eq!(name, "TestArtifact");
        assert_eq!(*source, FormatError::UndefinedKeys(vec!["author".into()]));
    }

    #[test]
    fn undefined_labels_are_recorded_not_rejected() {
        let raw = minimal(json!({"labels": ["System", "Totally Custom"]}));
        let definition = ArtifactDefinition::from_value(&raw).unwrap();
        assert_eq!(definition.labels.len(), 2);
        assert!(definition.undefined_labels.contains("Totally Custom"));
        assert!(!definition.undefined_labels.contains("System"));
    }

    #[test]
    fn unsupported_source_types_are_dropped_but_kept() {
        let raw = minimal(json!({"sources": [
            {"type": "REGISTRY_KEY", "attributes": {}},
            {"type": "file", "attributes": {"paths": []}},
        ]}));
        let definition = ArtifactDefinition::from_value(&raw).unwrap();
        assert_eq!(definition.sources.len(), 1);
        assert_eq!(definition.unsupported_source_types, vec!["REGISTRY_KEY"]);
    }

    #[test]
    fn all_sources_unsupported_fails_with_tags() {
        let raw = minimal(json!({"sources": [{"type": "REGISTRY_KEY", "attributes": {}}]}));
        let err = ArtifactDefinition::from_value(&raw).unwrap_err();
        let FormatError::Definition { source, .. } = err else {
            panic!("expected a wrapped error");
        };
        assert_eq!(
            *source,
            FormatError::NoSupportedSources(vec!["REGISTRY_KEY".into()])
        );
    }

    #[test]
    fn empty_source_list_fails_differently() {
        let raw = minimal(json!({"sources": []}));
        let err = ArtifactDefinition::from_value(&raw).unwrap_err();
        let FormatError::Definition { source, .. } = err else {
            panic!("expected a wrapped error");
        };
        assert_eq!(*source, FormatError::NoSources);
    }

    #[test]
    fn missing_sources_key_fails() {
        let raw = json!({"name": "X", "doc": "d"});
        let err = ArtifactDefinition::from_value(&raw).unwrap_err();
        let FormatError::Definition { source, .. } = err else {
            panic!("expected a wrapped error");
        };
        assert_eq!(*source, FormatError::Schema(SchemaError::MissingField("sources")));
    }

    #[test]
    fn undefined_supported_os_fails() {
        let raw = minimal(json!({"supported_os": ["Linux", "Solaris"]}));
        let err = ArtifactDefinition::from_value(&raw).unwrap_err();
        let FormatError::Definition { source, .. } = err else {
            panic!("expected a wrapped error");
        };
        assert_eq!(*source, FormatError::UndefinedSupportedOs(vec!["Solaris".into()]));
    }

    #[test]
    fn explicit_supported_os_is_kept() {
        let raw = minimal(json!({"supported_os": ["Linux", "Darwin"]}));
        let definition = ArtifactDefinition::from_value(&raw).unwrap();
        assert!(definition.supported_os.contains(&Platform::Linux));
        assert!(definition.supported_os.contains(&Platform::Darwin));
        assert!(!definition.supported_os.contains(&Platform::Windows));
    }

    #[test]
    fn non_mapping_definition_fails() {
        let err = ArtifactDefinition::from_value(&json!(["not", "a", "map"])).unwrap_err();
        let FormatError::Definition { name, source } = err else {
            panic!("expected a wrapped error");
        };
        assert_eq!(name, "unknown");
        assert_eq!(*source, FormatError::NotAMapping);
    }

    #[test]
    fn conditions_are_stored_verbatim() {
        let raw = minimal(json!({"conditions": ["os_major_version >= 6"]}));
        let definition = ArtifactDefinition::from_value(&raw).unwrap();
        assert_eq!(definition.conditions, vec![json!("os_major_version >= 6")]);
    }
}
