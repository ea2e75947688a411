//! Error types for schema loading and validation.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Where in the schema a validation failure was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationPosition {
    /// A model or one of its properties.
    Model,
    /// An enum or one of its values.
    Enum,
    /// A relation between two models.
    Relation,
}

impl ValidationPosition {
    /// Get the position as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Enum => "enum",
            Self::Relation => "relation",
        }
    }
}

impl std::fmt::Display for ValidationPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while loading or validating a schema.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading or writing a schema file.
    #[error("failed to access file: {path}")]
    #[diagnostic(code(relforge::schema::io_error))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The schema file is not valid YAML or does not match the schema shape.
    #[error("failed to parse schema YAML")]
    #[diagnostic(code(relforge::schema::yaml_error))]
    Yaml {
        #[source]
        source: serde_yaml::Error,
    },

    /// Structural or referential schema defect.
    #[error("{position} validation error: {message}")]
    #[diagnostic(code(relforge::schema::validation))]
    Validation {
        position: ValidationPosition,
        message: String,
    },

    /// A name contains characters outside the safe set.
    #[error("{position} validation error: `{name}` has special characters in it")]
    #[diagnostic(
        code(relforge::schema::unsafe_name),
        help("run `relforge clean` to strip the offending characters")
    )]
    UnsafeName {
        position: ValidationPosition,
        name: String,
    },

    /// The connection URL points at an environment variable that is not set.
    #[error("can't find env variable with name {name}")]
    #[diagnostic(code(relforge::schema::env_var))]
    EnvVar { name: String },
}

impl SchemaError {
    /// Create a validation error at the given position.
    pub fn validation(position: ValidationPosition, message: impl Into<String>) -> Self {
        Self::Validation {
            position,
            message: message.into(),
        }
    }

    /// Create a model-position validation error.
    pub fn model(message: impl Into<String>) -> Self {
        Self::validation(ValidationPosition::Model, message)
    }

    /// Create an enum-position validation error.
    pub fn enumeration(message: impl Into<String>) -> Self {
        Self::validation(ValidationPosition::Enum, message)
    }

    /// Create a relation-position validation error.
    pub fn relation(message: impl Into<String>) -> Self {
        Self::validation(ValidationPosition::Relation, message)
    }

    /// Create an unsafe-name error.
    pub fn unsafe_name(position: ValidationPosition, name: impl Into<String>) -> Self {
        Self::UnsafeName {
            position,
            name: name.into(),
        }
    }

    /// The validation position, if this is a validation failure.
    pub fn position(&self) -> Option<ValidationPosition> {
        match self {
            Self::Validation { position, .. } | Self::UnsafeName { position, .. } => {
                Some(*position)
            }
            _ => None,
        }
    }

    /// Check if the failure is purely a character-set problem the sanitizer can fix.
    pub fn is_repairable(&self) -> bool {
        matches!(self, Self::UnsafeName { .. })
    }

    /// Check if this error came out of validation (as opposed to I/O or parsing).
    pub fn is_validation(&self) -> bool {
        self.position().is_some()
    }
}

#[cfg(test)]
#[allow(unused_assignments)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_constructors() {
        assert_eq!(
            SchemaError::model("x").position(),
            Some(ValidationPosition::Model)
        );
        assert_eq!(
            SchemaError::enumeration("x").position(),
            Some(ValidationPosition::Enum)
        );
        assert_eq!(
            SchemaError::relation("x").position(),
            Some(ValidationPosition::Relation)
        );
    }

    #[test]
    fn test_validation_display() {
        let err = SchemaError::model("model with name User does not have id field");
        let display = err.to_string();
        assert!(display.starts_with("model validation error"));
        assert!(display.contains("User"));
    }

    #[test]
    fn test_unsafe_name_is_repairable() {
        let err = SchemaError::unsafe_name(ValidationPosition::Enum, "Ro$le");
        assert!(err.is_repairable());
        assert!(err.is_validation());
        assert!(err.to_string().contains("Ro$le"));
    }

    #[test]
    fn test_plain_validation_not_repairable() {
        assert!(!SchemaError::relation("one-sided").is_repairable());
    }

    #[test]
    fn test_env_var_display() {
        let err = SchemaError::EnvVar {
            name: "DATABASE_URL".to_string(),
        };
        assert!(err.to_string().contains("DATABASE_URL"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_io_error_display() {
        let err = SchemaError::Io {
            path: "relforge.yml".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("relforge.yml"));
        assert_eq!(err.position(), None);
    }
}
