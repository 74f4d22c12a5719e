//! Generic field-schema validation for raw definition mappings.
//!
//! Every validated type declares an ordered table of [`FieldSpec`] entries as
//! static data; [`validate_fields`] is the single routine that walks such a
//! table against a raw mapping, resolving defaults, enforcing presence and
//! kind, and binding the final values onto the typed target. No validated
//! type hand-rolls its own parsing loop.

use serde_json::{Map, Value};

use crate::errors::{FormatError, SchemaError};

/// Raw mapping shape shared by artifact definitions and source attributes.
pub type RawMap = Map<String, Value>;

/// Semantic kind tags for raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Bool,
    Int,
    Float,
    List,
    Map,
}

impl ValueKind {
    /// Kind of a raw value; nulls carry no kind.
    pub fn of(value: &Value) -> Option<ValueKind> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Number(n) if n.is_f64() => Some(ValueKind::Float),
            Value::Number(_) => Some(ValueKind::Int),
            Value::String(_) => Some(ValueKind::Str),
            Value::Array(_) => Some(ValueKind::List),
            Value::Object(_) => Some(ValueKind::Map),
        }
    }

    /// Zero value synthesized when a kind is declared without a default.
    /// The string kind synthesizes the empty string.
    pub fn zero(self) -> Value {
        match self {
            ValueKind::Str => Value::String(String::new()),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Int => Value::from(0),
            ValueKind::Float => Value::from(0.0),
            ValueKind::List => Value::Array(Vec::new()),
            ValueKind::Map => Value::Object(Map::new()),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            // Any number satisfies a float requirement.
            ValueKind::Float => value.is_number(),
            ValueKind::Int => value.is_i64() || value.is_u64(),
            _ => ValueKind::of(value) == Some(self),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Str => "string",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::List => "list",
            ValueKind::Map => "map",
        }
    }
}

/// Name of a raw value's runtime kind, for diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match ValueKind::of(value) {
        Some(kind) => kind.name(),
        None => "null",
    }
}

/// How a validated value lands on the target struct.
pub enum Bind<T> {
    /// Store the validated raw value through a conversion function.
    Store(fn(&mut T, Value) -> Result<(), SchemaError>),
    /// Derive the field from the whole raw mapping instead of copying it,
    /// e.g. building source objects or filtering label sets.
    Derive(fn(&mut T, &RawMap) -> Result<(), FormatError>),
}

/// One entry of a validated type's field table.
pub struct FieldSpec<T> {
    pub name: &'static str,
    pub kind: Option<ValueKind>,
    pub default: Option<fn() -> Value>,
    pub optional: bool,
    pub bind: Bind<T>,
}

/// Shared default for list-valued fields.
pub fn empty_list() -> Value {
    Value::Array(Vec::new())
}

/// Apply `specs` to `raw` in declaration order, binding results onto `target`.
///
/// A field with a declared default but no declared kind takes its required
/// kind from the default. A field with a declared kind but no default gets
/// the kind's zero value as default. Non-optional fields must be present;
/// present values must match the required kind whenever a default exists.
pub fn validate_fields<T>(
    target: &mut T,
    specs: &[FieldSpec<T>],
    raw: &RawMap,
) -> Result<(), FormatError> {
    for spec in specs {
        let mut required_kind = spec.kind;
        let mut default = spec.default.map(|make| make());

        if default.is_none() {
            if let Some(kind) = required_kind {
                default = Some(kind.zero());
            }
        }
        if required_kind.is_none() {
            if let Some(value) = &default {
                required_kind = ValueKind::of(value);
            }
        }

        if !spec.optional && !raw.contains_key(spec.name) {
            return Err(SchemaError::MissingField(spec.name).into());
        }

        let value = raw.get(spec.name).cloned().or_else(|| default.clone());

        // A resolved default implies a required kind for any present value.
        if default.is_some() {
            if let (Some(kind), Some(value)) = (required_kind, &value) {
                if !kind.matches(value) {
                    return Err(SchemaError::TypeMismatch {
                        field: spec.name,
                        expected: kind.name(),
                        actual: kind_name(value),
                    }
                    .into());
                }
            }
        }

        match spec.bind {
            Bind::Store(store) => {
                if let Some(value) = value {
                    store(target, value)?;
                }
            }
            Bind::Derive(derive) => derive(target, raw)?,
        }
    }
    Ok(())
}

pub fn into_string(value: Value, field: &'static str) -> Result<String, SchemaError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(SchemaError::TypeMismatch {
            field,
            expected: "string",
            actual: kind_name(&other),
        }),
    }
}

pub fn into_list(value: Value, field: &'static str) -> Result<Vec<Value>, SchemaError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(SchemaError::TypeMismatch {
            field,
            expected: "list",
            actual: kind_name(&other),
        }),
    }
}

pub fn into_string_list(value: Value, field: &'static str) -> Result<Vec<String>, SchemaError> {
    into_list(value, field)?
        .into_iter()
        .map(|item| into_string(item, field))
        .collect()
}
