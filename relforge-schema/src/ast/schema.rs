//! Top-level schema definition.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;

use crate::error::{SchemaError, SchemaResult};

/// A complete relforge schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Database connection settings.
    pub connection: Connection,
    /// Models in declaration order.
    #[serde(default)]
    pub models: Vec<Model>,
    /// Enums in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<Enum>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            models: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Add a model.
    pub fn with_model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    /// Add an enum.
    pub fn with_enum(mut self, e: Enum) -> Self {
        self.enums.push(e);
        self
    }

    /// Get a model by name.
    pub fn get_model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Get an enum by name.
    pub fn get_enum(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Iterate over every property that declares a relation, with its model.
    pub fn relation_properties(&self) -> impl Iterator<Item = (&Model, &Property)> {
        self.models.iter().flat_map(|m| {
            m.properties
                .iter()
                .filter(|p| p.is_relation())
                .map(move |p| (m, p))
        })
    }
}

/// Supported database providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Provider {
    /// PostgreSQL.
    #[default]
    #[serde(rename = "postgresql", alias = "postgres")]
    PostgreSql,
    /// MySQL. Accepted in schemas, not migratable.
    #[serde(rename = "mysql")]
    MySql,
}

impl Provider {
    /// Parse a provider from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "postgresql" | "postgres" => Some(Self::PostgreSql),
            "mysql" => Some(Self::MySql),
            _ => None,
        }
    }

    /// Get the provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Database connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Database provider.
    pub provider: Provider,
    /// Connection URL, or `env("NAME")` to read it from the environment.
    pub url: String,
}

impl Connection {
    /// Create new connection settings.
    pub fn new(provider: Provider, url: impl Into<String>) -> Self {
        Self {
            provider,
            url: url.into(),
        }
    }

    /// The environment variable named by an `env("NAME")` URL, if any.
    pub fn env_var(&self) -> Option<&str> {
        let re = regex_lite::Regex::new(r#"^env\("(\S+)"\)$"#).ok()?;
        re.captures(self.url.trim())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Resolve the connection URL, reading the environment when indirected.
    pub fn resolve_url(&self) -> SchemaResult<String> {
        match self.env_var() {
            Some(name) => {
                let value = std::env::var(name).map_err(|_| SchemaError::EnvVar {
                    name: name.to_string(),
                })?;
                tracing::debug!(variable = name, "resolved connection url from environment");
                Ok(value)
            }
            None => Ok(self.url.clone()),
        }
    }
}

/// A model, mapped to one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Model name, also the table name.
    pub name: SmolStr,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Model {
    /// Create a new model.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Get a property by name.
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The first property marked as id.
    pub fn id_property(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.id)
    }
}

/// A single model property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property name, also the column name.
    pub name: SmolStr,
    /// Raw type token, e.g. `int`, `string?`, `Todo[]`.
    #[serde(rename = "type")]
    pub property_type: SmolStr,
    /// Raw default expression.
    #[serde(
        default,
        deserialize_with = "deserialize_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    /// Whether the column is unique.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    /// Whether this is the primary key.
    #[serde(default, skip_serializing_if = "is_false")]
    pub id: bool,
    /// Local column holding the foreign key.
    #[serde(
        default,
        deserialize_with = "deserialize_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub relation_field: Option<SmolStr>,
    /// Column on the referenced model the foreign key points at.
    #[serde(
        default,
        deserialize_with = "deserialize_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_field: Option<SmolStr>,
}

impl Property {
    /// Create a new property.
    pub fn new(name: impl Into<SmolStr>, property_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            property_type: property_type.into(),
            ..Default::default()
        }
    }

    /// Mark as primary key.
    pub fn with_id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Mark as unique.
    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the default expression.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Declare this property as the owning side of a relation.
    pub fn with_relation(
        mut self,
        relation_field: impl Into<SmolStr>,
        reference_field: impl Into<SmolStr>,
    ) -> Self {
        self.relation_field = Some(relation_field.into());
        self.reference_field = Some(reference_field.into());
        self
    }

    /// The default expression, if non-empty.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref().filter(|d| !d.is_empty())
    }

    /// The `(relationField, referenceField)` pair when both are set.
    pub fn relation_fields(&self) -> Option<(&str, &str)> {
        match (&self.relation_field, &self.reference_field) {
            (Some(rel), Some(reference)) => Some((rel.as_str(), reference.as_str())),
            _ => None,
        }
    }

    /// Check if this property owns a relation.
    pub fn is_relation(&self) -> bool {
        self.relation_fields().is_some()
    }
}

/// An enum, mapped to a database enum type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    /// Enum name.
    pub name: SmolStr,
    /// Values in declaration order.
    #[serde(default)]
    pub values: Vec<SmolStr>,
}

impl Enum {
    /// Create a new enum.
    pub fn new<I, S>(name: impl Into<SmolStr>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a value is declared.
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Accept any YAML scalar as a default; `5` and `"5"` are the same default.
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_yaml::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "default must be a scalar, found {other:?}"
        ))),
    }
}

/// Empty relation field names are treated as unset.
fn deserialize_name<'de, D>(deserializer: D) -> Result<Option<SmolStr>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<SmolStr>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
