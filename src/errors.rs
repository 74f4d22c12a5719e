use thiserror::Error;

/// Errors raised by the generic field-schema validator.
///
/// Always fatal to the construction of the enclosing object; callers wrap
/// them with the owning definition's name for context.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("field {field} has type {actual}, should be {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unsupported column type {0}")]
    UnsupportedColumnType(String),

    #[error("column definition must carry both name and type")]
    IncompleteColumn,
}

/// Errors raised while loading a single artifact definition or source.
///
/// Fatal at single-definition scope; the registry's lenient add catches
/// them, logs one diagnostic line and drops the definition.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("artifact definition must be a mapping")]
    NotAMapping,

    #[error("undefined keys: {}", .0.join(", "))]
    UndefinedKeys(Vec<String>),

    #[error("source is not a mapping")]
    SourceNotAMapping,

    #[error("source has no type")]
    SourceWithoutType,

    #[error("source has no attributes")]
    SourceWithoutAttributes,

    #[error("no supported sources: {}", .0.join(", "))]
    NoSupportedSources(Vec<String>),

    #[error("no sources declared")]
    NoSources,

    #[error("supported operating system not defined: {}", .0.join(", "))]
    UndefinedSupportedOs(Vec<String>),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("definition {name}: {source}")]
    Definition {
        name: String,
        #[source]
        source: Box<FormatError>,
    },
}

/// Errors that abort a whole collection run.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("unknown artifact {0}")]
    NotFound(String),

    #[error("unable to determine running environment")]
    EnvironmentUndetermined,

    #[error(transparent)]
    Capability(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_carries_definition_name() {
        let err = FormatError::Definition {
            name: "BrowserHistory".to_string(),
            source: Box::new(SchemaError::MissingField("doc").into()),
        };
        assert_eq!(err.to_string(), "definition BrowserHistory: missing field doc");
    }

    #[test]
    fn undefined_keys_are_joined() {
        let err = FormatError::UndefinedKeys(vec!["foo".into(), "bar".into()]);
        assert_eq!(err.to_string(), "undefined keys: foo, bar");
    }
}
