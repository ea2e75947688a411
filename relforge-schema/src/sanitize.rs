//! Identifier sanitization.
//!
//! Names may only contain ASCII letters, `_` and `-`. Type tokens may
//! additionally contain `?`, `[` and `]`. Sanitizing drops every other
//! character and is idempotent.

use smol_str::SmolStr;

use crate::ast::{Enum, Model, Property, Schema, strip_modifiers};

fn keep_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-'
}

fn keep_type_char(c: char) -> bool {
    keep_name_char(c) || matches!(c, '?' | '[' | ']')
}

/// Check that a name contains only safe characters.
pub fn is_safe(name: &str) -> bool {
    name.chars().all(keep_name_char)
}

/// Check that a type token contains only safe characters.
pub fn is_safe_type(token: &str) -> bool {
    token.chars().all(keep_type_char)
}

/// Strip unsafe characters from a name.
pub fn sanitize(name: &str) -> String {
    name.chars().filter(|c| keep_name_char(*c)).collect()
}

/// Strip unsafe characters from a type token.
pub fn sanitize_type(token: &str) -> String {
    token.chars().filter(|c| keep_type_char(*c)).collect()
}

fn clean(name: &SmolStr) -> SmolStr {
    if is_safe(name) {
        name.clone()
    } else {
        SmolStr::new(sanitize(name))
    }
}

/// Produce a sanitized copy of a schema.
///
/// Model, enum, property and enum value names are cleaned, as are type tokens
/// and relation field names. Defaults of enum-typed properties are cleaned
/// like the enum values they name. The connection and all flags are carried
/// over untouched.
pub fn sanitize_schema(schema: &Schema) -> Schema {
    let enums: Vec<Enum> = schema
        .enums
        .iter()
        .map(|e| Enum {
            name: clean(&e.name),
            values: e.values.iter().map(clean).collect(),
        })
        .collect();

    let models = schema
        .models
        .iter()
        .map(|model| Model {
            name: clean(&model.name),
            properties: model
                .properties
                .iter()
                .map(|p| sanitize_property(p, &enums))
                .collect(),
        })
        .collect();

    Schema {
        connection: schema.connection.clone(),
        models,
        enums,
    }
}

fn sanitize_property(property: &Property, enums: &[Enum]) -> Property {
    let property_type = sanitize_type(&property.property_type);
    let is_enum = enums
        .iter()
        .any(|e| e.name == strip_modifiers(&property_type));
    let default = match &property.default {
        Some(value) if is_enum && !is_safe(value) => Some(sanitize(value)),
        other => other.clone(),
    };

    Property {
        name: clean(&property.name),
        property_type: SmolStr::new(property_type),
        default,
        relation_field: property.relation_field.as_ref().map(clean),
        reference_field: property.reference_field.as_ref().map(clean),
        ..property.clone()
    }
}
