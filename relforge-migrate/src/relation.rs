//! Relation inference.
//!
//! The owning property of a relation carries `relationField` and
//! `referenceField`. Its type names the referenced model. The mirror property
//! is the property on the referenced model whose type names the owning model.
//! Cardinality follows from the `[]` markers on the two raw types.

use relforge_schema::{Cardinality, Model, Relation, TypeToken, strip_modifiers};
use tracing::trace;

use crate::error::{MigrateResult, MigrationError};

/// Infer the relation declared by `owner.properties[property_index]`.
pub fn infer_relation(
    owner: &Model,
    models: &[Model],
    property_index: usize,
) -> MigrateResult<Relation> {
    let property = owner.properties.get(property_index).ok_or_else(|| {
        MigrationError::sql_generation(format!(
            "model {} has no property at index {}",
            owner.name, property_index
        ))
    })?;
    let (relation_field, reference_field) = property.relation_fields().ok_or_else(|| {
        MigrationError::sql_generation(format!(
            "property {} of model {} does not declare a relation",
            property.name, owner.name
        ))
    })?;

    let owner_token = TypeToken::parse(&property.property_type);
    let target = models
        .iter()
        .find(|m| m.name == owner_token.name)
        .ok_or_else(|| {
            MigrationError::sql_generation(format!(
                "model {} referenced by {}.{} not found",
                owner_token.name, owner.name, property.name
            ))
        })?;

    let self_relation = target.name == owner.name;
    let mirror = target
        .properties
        .iter()
        .enumerate()
        .filter(|(i, _)| !(self_relation && *i == property_index))
        .map(|(_, p)| p)
        .find(|p| owner.name == strip_modifiers(&p.property_type))
        .ok_or_else(|| {
            MigrationError::sql_generation(format!(
                "reference field for {}.{} not found on model {}",
                owner.name, property.name, target.name
            ))
        })?;

    let mirror_token = TypeToken::parse(&mirror.property_type);
    let cardinality = Cardinality::from_sides(owner_token.is_list(), mirror_token.is_list())
        .ok_or_else(|| {
            MigrationError::sql_generation(format!(
                "relation field {}.{} is array type, but reference field {}.{} is not",
                owner.name, property.name, target.name, mirror.name
            ))
        })?;

    let relation = Relation::new(
        cardinality,
        owner.name.clone(),
        relation_field,
        target.name.clone(),
        reference_field,
    );
    trace!(%relation, "inferred relation");
    Ok(relation)
}
