use serde::{Deserialize, Serialize};

/// Direction/shape of an association, without its routing data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// Parent holds a collection; children store the parent's key
    OwnsMany,
    /// Child stores the parent's key; inverse of `OwnsMany`
    BelongsTo,
    /// Composition of two other associations through an intermediate type
    IndirectMany,
}

/// Options supplied at declaration time
///
/// `foreign_key` is required for `OwnsMany` and `BelongsTo`.
/// `through` and `source` are required for `IndirectMany`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationOptions {
    pub foreign_key: Option<String>,
    pub through: Option<String>,
    pub source: Option<String>,
}

impl AssociationOptions {
    pub fn foreign_key(foreign_key: impl Into<String>) -> Self {
        Self {
            foreign_key: Some(foreign_key.into()),
            ..Self::default()
        }
    }

    pub fn through(through: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            through: Some(through.into()),
            source: Some(source.into()),
            ..Self::default()
        }
    }
}

/// Routing data for each kind. Resolution dispatches on this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssociationRoute {
    /// Foreign key lives on the target entity type
    OwnsMany { foreign_key: String },
    /// Foreign key lives on the owner entity type
    BelongsTo { foreign_key: String },
    /// `through` is declared on the owner, `source` on `through`'s target
    IndirectMany { through: String, source: String },
}

/// A declared, directed relationship between two entity types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// Entity type the association is declared on
    pub owner: String,

    /// Association name, unique per owner
    pub name: String,

    /// Entity type of the related records
    pub target: String,

    pub route: AssociationRoute,
}

impl Association {
    pub fn kind(&self) -> AssociationKind {
        match self.route {
            AssociationRoute::OwnsMany { .. } => AssociationKind::OwnsMany,
            AssociationRoute::BelongsTo { .. } => AssociationKind::BelongsTo,
            AssociationRoute::IndirectMany { .. } => AssociationKind::IndirectMany,
        }
    }

    /// `BelongsTo` yields at most one record, everything else a collection
    pub fn is_singular(&self) -> bool {
        self.kind() == AssociationKind::BelongsTo
    }

    /// Qualified name used in logs and error messages
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }
}

impl std::fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssociationKind::OwnsMany => write!(f, "owns-many"),
            AssociationKind::BelongsTo => write!(f, "belongs-to"),
            AssociationKind::IndirectMany => write!(f, "indirect-many"),
        }
    }
}
