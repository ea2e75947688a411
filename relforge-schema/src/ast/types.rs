//! Property type tokens and their column mapping.
//!
//! A type token is a base name (`int`, `string`, a model or enum name)
//! optionally followed by one modifier: `?` for a nullable column or `[]` for
//! an array column. Only one modifier is allowed per token.

use serde::{Deserialize, Serialize};

use super::Property;
use crate::error::{SchemaError, SchemaResult};

/// Column types for every concrete scalar token.
///
/// Required scalars carry `NOT NULL`, arrays and nullable scalars do not.
pub const COLUMN_TYPES: [(&str, &str); 15] = [
    ("int", "int NOT NULL"),
    ("int[]", "int[]"),
    ("int?", "int"),
    ("boolean", "boolean NOT NULL"),
    ("boolean[]", "boolean[]"),
    ("boolean?", "boolean"),
    ("float", "double precision NOT NULL"),
    ("float[]", "double precision[]"),
    ("float?", "double precision"),
    ("string", "text NOT NULL"),
    ("string[]", "text[]"),
    ("string?", "text"),
    ("dateTime", "timestamptz NOT NULL"),
    ("dateTime[]", "timestamptz[]"),
    ("dateTime?", "timestamptz"),
];

/// Default sentinel for auto-incrementing integer ids.
pub const AUTOINCREMENT: &str = "autoincrement()";
/// Default sentinel for generated uuid strings.
pub const UUID: &str = "uuid()";
/// Default sentinel for the current timestamp.
pub const NOW: &str = "now()";

/// Resolve a scalar type token to its column type.
///
/// Returns `None` for anything that is not one of the fifteen scalar tokens;
/// the caller decides whether the token names an enum or a model instead.
pub fn resolve_column_type(token: &str) -> Option<&'static str> {
    COLUMN_TYPES
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, column)| *column)
}

/// Strip a trailing `[]` or `?` from a type token.
pub fn strip_modifiers(token: &str) -> &str {
    TypeToken::parse(token).name
}

/// Scalar base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// 32-bit integer.
    Int,
    /// Boolean.
    Boolean,
    /// Double precision float.
    Float,
    /// Text.
    String,
    /// Timestamp with time zone.
    DateTime,
}

impl ScalarType {
    /// Parse a scalar type from its token name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "int" => Some(Self::Int),
            "boolean" => Some(Self::Boolean),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            "dateTime" => Some(Self::DateTime),
            _ => None,
        }
    }

    /// Get the token name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::String => "string",
            Self::DateTime => "dateTime",
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypeModifier {
    /// No modifier, the column is `NOT NULL`.
    #[default]
    Required,
    /// `?` suffix.
    Optional,
    /// `[]` suffix.
    List,
}

impl TypeModifier {
    /// The token suffix for this modifier.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Required => "",
            Self::Optional => "?",
            Self::List => "[]",
        }
    }
}

/// A type token split into its base name and modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeToken<'a> {
    /// Base name without suffix.
    pub name: &'a str,
    /// The suffix, if any.
    pub modifier: TypeModifier,
}

impl<'a> TypeToken<'a> {
    /// Split a raw type token.
    pub fn parse(token: &'a str) -> Self {
        if let Some(name) = token.strip_suffix("[]") {
            Self {
                name,
                modifier: TypeModifier::List,
            }
        } else if let Some(name) = token.strip_suffix('?') {
            Self {
                name,
                modifier: TypeModifier::Optional,
            }
        } else {
            Self {
                name: token,
                modifier: TypeModifier::Required,
            }
        }
    }

    /// The scalar base type, if the base name is one.
    pub fn scalar(&self) -> Option<ScalarType> {
        ScalarType::from_str(self.name)
    }

    /// Check for the `[]` suffix.
    pub fn is_list(&self) -> bool {
        self.modifier == TypeModifier::List
    }

    /// Check for the `?` suffix.
    pub fn is_optional(&self) -> bool {
        self.modifier == TypeModifier::Optional
    }
}

impl std::fmt::Display for TypeToken<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.modifier.suffix())
    }
}

/// A parsed, validated default value.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// `autoincrement()` on an integer id.
    AutoIncrement,
    /// `uuid()` on a string column.
    Uuid,
    /// `now()` on a timestamp column.
    Now,
    /// Integer literal, in the range of the 32-bit `int` column.
    Int(i32),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Boolean(bool),
    /// String literal, unquoted.
    String(String),
}

impl DefaultValue {
    /// Check if this is one of the function sentinels.
    pub fn is_function(&self) -> bool {
        matches!(self, Self::AutoIncrement | Self::Uuid | Self::Now)
    }
}

/// Validate a property's default against its scalar type.
///
/// Returns `Ok(None)` when the property has no default. Enum defaults are not
/// handled here; they depend on the enum's declared values.
pub fn validate_default(property: &Property) -> SchemaResult<Option<DefaultValue>> {
    let Some(raw) = property.default_value() else {
        return Ok(None);
    };

    let token = TypeToken::parse(&property.property_type);
    let invalid = |reason: &str| {
        SchemaError::model(format!(
            "default value `{}` of property {} is not valid: {}",
            raw, property.name, reason
        ))
    };

    if token.is_list() {
        return Err(invalid("array types cannot have a default"));
    }
    let Some(scalar) = token.scalar() else {
        return Err(invalid(&format!(
            "type {} does not support default values",
            property.property_type
        )));
    };

    if raw == AUTOINCREMENT {
        return if scalar == ScalarType::Int && property.id {
            Ok(Some(DefaultValue::AutoIncrement))
        } else {
            Err(invalid("autoincrement() is only allowed on an int id"))
        };
    }

    let value = match scalar {
        ScalarType::Int => raw
            .parse::<i32>()
            .map(DefaultValue::Int)
            .map_err(|e| invalid(&e.to_string()))?,
        ScalarType::Float => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => DefaultValue::Float(v),
            Ok(_) => return Err(invalid("float default must be finite")),
            Err(e) => return Err(invalid(&e.to_string())),
        },
        ScalarType::Boolean => match raw {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => DefaultValue::Boolean(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => DefaultValue::Boolean(false),
            _ => return Err(invalid("expected true or false")),
        },
        ScalarType::String if raw == UUID => DefaultValue::Uuid,
        ScalarType::String => DefaultValue::String(raw.to_string()),
        ScalarType::DateTime if raw == NOW => DefaultValue::Now,
        ScalarType::DateTime => return Err(invalid("dateTime only accepts now()")),
    };

    Ok(Some(value))
}
