//! Schema validation.
//!
//! Validation is fail-fast and runs in a fixed order:
//! 1. Index model and enum names
//! 2. Enums
//! 3. Models and their properties
//! 4. Relations, which must be declared on both ends
//!
//! The first problem found is returned; errors are never accumulated.

use indexmap::IndexSet;
use smol_str::SmolStr;
use tracing::debug;

use crate::ast::*;
use crate::error::{SchemaError, SchemaResult, ValidationPosition};
use crate::sanitize::{is_safe, is_safe_type};

/// Names declared by a valid schema, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaIndex {
    /// Enum names.
    pub enum_names: IndexSet<SmolStr>,
    /// Model names.
    pub model_names: IndexSet<SmolStr>,
}

impl SchemaIndex {
    /// Check if a name is a declared enum.
    pub fn is_enum(&self, name: &str) -> bool {
        self.enum_names.contains(name)
    }

    /// Check if a name is a declared model.
    pub fn is_model(&self, name: &str) -> bool {
        self.model_names.contains(name)
    }

    /// Check if a property becomes a table column.
    ///
    /// Relation properties and properties typed as a model are not columns.
    pub fn is_column(&self, property: &Property) -> bool {
        !property.is_relation() && !self.is_model(strip_modifiers(&property.property_type))
    }
}

/// Validate a schema, returning its name index.
pub fn validate(schema: &Schema) -> SchemaResult<SchemaIndex> {
    Validator::new(schema).validate()
}

/// Schema validator.
#[derive(Debug)]
pub struct Validator<'a> {
    schema: &'a Schema,
    index: SchemaIndex,
}

impl<'a> Validator<'a> {
    /// Create a new validator for a schema.
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            index: SchemaIndex::default(),
        }
    }

    /// Run every check in order and return the name index.
    pub fn validate(mut self) -> SchemaResult<SchemaIndex> {
        self.build_index()?;

        for e in &self.schema.enums {
            self.validate_enum(e)?;
        }

        if self.schema.models.is_empty() {
            return Err(SchemaError::model("no models provided"));
        }
        for model in &self.schema.models {
            self.validate_model(model)?;
        }

        for (model, property) in self.schema.relation_properties() {
            self.validate_relation(model, property)?;
        }

        debug!(
            models = self.index.model_names.len(),
            enums = self.index.enum_names.len(),
            "schema validated"
        );
        Ok(self.index)
    }

    fn build_index(&mut self) -> SchemaResult<()> {
        for e in &self.schema.enums {
            if !self.index.enum_names.insert(e.name.clone()) {
                return Err(SchemaError::enumeration(format!(
                    "enum with name {} is declared more than once",
                    e.name
                )));
            }
        }

        for model in &self.schema.models {
            if self.index.is_enum(&model.name) {
                return Err(SchemaError::model(format!(
                    "model with name {} clashes with an enum of the same name",
                    model.name
                )));
            }
            if !self.index.model_names.insert(model.name.clone()) {
                return Err(SchemaError::model(format!(
                    "model with name {} is declared more than once",
                    model.name
                )));
            }
        }

        Ok(())
    }

    fn validate_enum(&self, e: &Enum) -> SchemaResult<()> {
        check_name(ValidationPosition::Enum, &e.name, "enum name is empty")?;

        if e.values.len() < 2 {
            return Err(SchemaError::enumeration(format!(
                "enum with name {} has less than 2 values",
                e.name
            )));
        }

        let mut seen = IndexSet::new();
        for value in &e.values {
            check_name(
                ValidationPosition::Enum,
                value,
                &format!("enum with name {} has an empty value", e.name),
            )?;
            if !seen.insert(value.as_str()) {
                return Err(SchemaError::enumeration(format!(
                    "enum with name {} has duplicate value {}",
                    e.name, value
                )));
            }
        }

        Ok(())
    }

    fn validate_model(&self, model: &Model) -> SchemaResult<()> {
        check_name(ValidationPosition::Model, &model.name, "model name is empty")?;

        if model.properties.len() < 2 {
            return Err(SchemaError::model(format!(
                "model with name {} has less than 2 properties",
                model.name
            )));
        }

        let mut seen = IndexSet::new();
        let mut ids = 0;
        for property in &model.properties {
            check_name(
                ValidationPosition::Model,
                &property.name,
                &format!("model with name {} has a property with empty name", model.name),
            )?;
            if !seen.insert(property.name.as_str()) {
                return Err(SchemaError::model(format!(
                    "property {} is declared more than once in model {}",
                    property.name, model.name
                )));
            }

            self.validate_property(model, property)?;

            if property.id {
                ids += 1;
                if ids > 1 {
                    return Err(SchemaError::model(format!(
                        "model with name {} has more than one id field",
                        model.name
                    )));
                }
            }
        }

        if ids == 0 {
            return Err(SchemaError::model(format!(
                "model with name {} does not have id field",
                model.name
            )));
        }

        Ok(())
    }

    fn validate_property(&self, model: &Model, property: &Property) -> SchemaResult<()> {
        let raw = property.property_type.as_str();
        if raw.is_empty() {
            return Err(SchemaError::model(format!(
                "property {} of model {} has no type",
                property.name, model.name
            )));
        }
        if !is_safe_type(raw) {
            return Err(SchemaError::unsafe_name(ValidationPosition::Model, raw));
        }

        match (&property.relation_field, &property.reference_field) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(SchemaError::relation(format!(
                    "property {} of model {} must set both relationField and referenceField",
                    property.name, model.name
                )));
            }
            (Some(rel), Some(reference)) => {
                for field in [rel, reference] {
                    if !is_safe(field) {
                        return Err(SchemaError::unsafe_name(
                            ValidationPosition::Relation,
                            field.as_str(),
                        ));
                    }
                }
            }
            (None, None) => {}
        }

        let token = TypeToken::parse(raw);
        let is_scalar = resolve_column_type(raw).is_some();
        let is_enum = self.index.is_enum(token.name);
        let is_model = self.index.is_model(token.name);

        if !(is_scalar || is_enum || is_model || property.is_relation()) {
            return Err(SchemaError::model(format!(
                "{} type in {} property ({} model) is not valid",
                raw, property.name, model.name
            )));
        }

        if property.id {
            let reason = if is_enum {
                Some("can't be of enum type")
            } else if token.is_optional() {
                Some("can't be optional")
            } else if token.is_list() {
                Some("can't be an array")
            } else if !is_scalar || property.is_relation() {
                Some("must be a scalar type")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(SchemaError::model(format!(
                    "id property {} of model {} {}",
                    property.name, model.name, reason
                )));
            }
        }

        if let Some(default) = property.default_value() {
            if is_enum {
                self.validate_enum_default(model, property, &token, default)?;
            } else {
                validate_default(property)?;
            }
        }

        Ok(())
    }

    fn validate_enum_default(
        &self,
        model: &Model,
        property: &Property,
        token: &TypeToken<'_>,
        default: &str,
    ) -> SchemaResult<()> {
        let valid = !token.is_list()
            && self
                .schema
                .get_enum(token.name)
                .is_some_and(|e| e.has_value(default));

        if valid {
            Ok(())
        } else {
            Err(SchemaError::model(format!(
                "default value `{}` of property {} ({} model) is not a value of enum {}",
                default, property.name, model.name, token
            )))
        }
    }

    fn validate_relation(&self, model: &Model, property: &Property) -> SchemaResult<()> {
        let Some((relation_field, reference_field)) = property.relation_fields() else {
            return Ok(());
        };
        let target_name = strip_modifiers(&property.property_type);

        let Some(target) = self.schema.get_model(target_name) else {
            return Err(SchemaError::relation(format!(
                "property {} of model {} references unknown model {}",
                property.name, model.name, target_name
            )));
        };

        match model.get_property(relation_field) {
            None => {
                return Err(SchemaError::relation(format!(
                    "relationField {} is not a property of model {}",
                    relation_field, model.name
                )));
            }
            Some(p) if !self.index.is_column(p) => {
                return Err(SchemaError::relation(format!(
                    "relationField {} of model {} is a relation, not a column",
                    relation_field, model.name
                )));
            }
            Some(_) => {}
        }
        match target.get_property(reference_field) {
            None => {
                return Err(SchemaError::relation(format!(
                    "referenceField {} is not a property of model {}",
                    reference_field, target.name
                )));
            }
            Some(p) if !self.index.is_column(p) => {
                return Err(SchemaError::relation(format!(
                    "referenceField {} of model {} is a relation, not a column",
                    reference_field, target.name
                )));
            }
            Some(_) => {}
        }

        let mirrored = target.properties.iter().any(|p| {
            !std::ptr::eq(p, property) && model.name == strip_modifiers(&p.property_type)
        });
        if !mirrored {
            return Err(SchemaError::relation(format!(
                "relations should be created for both models {} and {}",
                model.name, target.name
            )));
        }

        Ok(())
    }
}

fn check_name(position: ValidationPosition, name: &str, empty_message: &str) -> SchemaResult<()> {
    if name.is_empty() {
        Err(SchemaError::validation(position, empty_message))
    } else if !is_safe(name) {
        Err(SchemaError::unsafe_name(position, name))
    } else {
        Ok(())
    }
}
