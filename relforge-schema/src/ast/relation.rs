//! Relations between models.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Cardinality of a relation, decided by the array markers on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Neither side is an array.
    OneToOne,
    /// Only the mirror side is an array.
    OneToMany,
    /// Both sides are arrays.
    ManyToMany,
}

impl Cardinality {
    /// Decide the cardinality from the owning and mirror array markers.
    ///
    /// Returns `None` when the owner is an array but the mirror is not.
    pub fn from_sides(owner_is_list: bool, mirror_is_list: bool) -> Option<Self> {
        match (owner_is_list, mirror_is_list) {
            (false, false) => Some(Self::OneToOne),
            (false, true) => Some(Self::OneToMany),
            (true, true) => Some(Self::ManyToMany),
            (true, false) => None,
        }
    }

    /// Check if the foreign key constraint should be deferrable.
    pub fn is_deferrable(&self) -> bool {
        matches!(self, Self::OneToOne)
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneToOne => write!(f, "1:1"),
            Self::OneToMany => write!(f, "1:n"),
            Self::ManyToMany => write!(f, "m:n"),
        }
    }
}

/// A resolved relation. Derived per generation pass, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Cardinality.
    pub cardinality: Cardinality,
    /// The model holding the foreign key.
    pub relation_model: SmolStr,
    /// The model being referenced.
    pub reference_model: SmolStr,
    /// Foreign key column on the relation model.
    pub relation_field: SmolStr,
    /// Referenced column on the reference model.
    pub reference_field: SmolStr,
}

impl Relation {
    /// Create a new relation.
    pub fn new(
        cardinality: Cardinality,
        relation_model: impl Into<SmolStr>,
        relation_field: impl Into<SmolStr>,
        reference_model: impl Into<SmolStr>,
        reference_field: impl Into<SmolStr>,
    ) -> Self {
        Self {
            cardinality,
            relation_model: relation_model.into(),
            reference_model: reference_model.into(),
            relation_field: relation_field.into(),
            reference_field: reference_field.into(),
        }
    }

    /// Check if both ends are the same model.
    pub fn is_self_relation(&self) -> bool {
        self.relation_model == self.reference_model
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{} ({})",
            self.relation_model,
            self.relation_field,
            self.reference_model,
            self.reference_field,
            self.cardinality
        )
    }
}
