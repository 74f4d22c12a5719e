//! In-memory registry of validated artifact definitions.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::definitions::ArtifactDefinition;
use crate::errors::FormatError;

/// Ordered collection of definitions with a name index.
///
/// Cloning yields an independent registry, so a caller can layer
/// request-scoped definitions onto a copy without touching the shared
/// instance.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: Vec<Arc<ArtifactDefinition>>,
    by_name: HashMap<String, Arc<ArtifactDefinition>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict add: validate and index one raw definition.
    pub fn insert(&mut self, raw: &Value) -> Result<(), FormatError> {
        let definition = Arc::new(ArtifactDefinition::from_value(raw)?);
        self.by_name
            .insert(definition.name.clone(), Arc::clone(&definition));
        self.definitions.push(definition);
        Ok(())
    }

    /// Lenient add: a definition that fails validation is logged and skipped,
    /// so one bad document never aborts a bulk load.
    pub fn add(&mut self, raw: &Value) -> bool {
        match self.insert(raw) {
            Ok(()) => true,
            Err(e) => {
                let name = raw.get("name").and_then(Value::as_str).unwrap_or("unknown");
                debug!("Skipping artifact {}: {}", name, e);
                false
            }
        }
    }

    /// Load every document of a YAML stream leniently; returns how many were
    /// kept.
    pub fn load_yaml_str(&mut self, text: &str) -> Result<usize> {
        let mut added = 0;
        for document in parse_documents(text)? {
            if self.add(&document) {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn load_yaml_file(&mut self, path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read definitions file: {}", path.display()))?;
        self.load_yaml_str(&content)
            .context(format!("Failed to parse definitions file: {}", path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&ArtifactDefinition> {
        self.by_name.get(name).map(Arc::as_ref)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ArtifactDefinition> {
        self.definitions.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Split a YAML stream into its documents as loosely-typed values.
pub fn parse_documents(text: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for deserializer in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(deserializer).context("Failed to parse YAML document")?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(name: &str) -> Value {
        json!({
            "name": name,
            "doc": "doc",
            "sources": [{"type": "file", "attributes": {"paths": ["/etc/hosts"]}}],
        })
    }

    #[test]
    fn insert_then_lookup() {
        let mut registry = Registry::new();
        registry.insert(&definition("A")).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("A").unwrap().name, "A");
        assert!(registry.get("B").is_none());
    }

    #[test]
    fn add_swallows_invalid_definitions() {
        let mut registry = Registry::new();
        assert!(registry.add(&definition("A")));
        assert!(!registry.add(&json!({"name": "bad"})));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clone_is_independent() {
        let mut base = Registry::new();
        base.insert(&definition("A")).unwrap();

        let mut layered = base.clone();
        layered.insert(&definition("B")).unwrap();

        assert_eq!(base.len(), 1);
        assert!(base.get("B").is_none());
        assert_eq!(layered.len(), 2);
        assert!(layered.get("A").is_some());
    }

    #[test]
    fn multi_document_stream_loads_best_effort() {
        let text = r#"
name: Good
doc: ok
sources:
  - type: file
    attributes:
      paths: ["/etc/hosts"]
---
name: Bad
doc: missing sources
---
name: AlsoGood
doc: ok
sources:
  - type: file
    attributes:
      paths: ["/etc/passwd"]
"#;
        let mut registry = Registry::new();
        let added = registry.load_yaml_str(text).unwrap();
        assert_eq!(added, 2);
        assert!(registry.get("Good").is_some());
        assert!(registry.get("Bad").is_none());
        assert!(registry.get("AlsoGood").is_some());
    }

    #[test]
    fn parse_documents_skips_empty() {
        let documents = parse_documents("---\n---\nname: X\n").unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0], json!({"name": "X"}));
    }
}
