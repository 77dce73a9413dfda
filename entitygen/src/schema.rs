//! Schema types describing the target entity classes.
//!
//! A [`ClassSchema`] is the declarative input to the generator: an ordered
//! list of scalar fields and associations for one PHP class. Schemas are
//! loaded from a manifest (or built by the caller) and borrowed read-only
//! by the synthesizer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete schema for one entity class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSchema {
    /// Fully qualified class name (e.g., `App\Entity\Order`)
    pub name: String,

    /// Path to the class source file
    pub path: PathBuf,

    /// Identifier generation strategy for the class
    #[serde(default)]
    pub id_generator: IdGenerator,

    /// Scalar fields, in declaration order
    #[serde(default)]
    pub fields: Vec<FieldMapping>,

    /// Associations to other entities, in declaration order
    #[serde(default)]
    pub associations: Vec<AssociationMapping>,
}

impl ClassSchema {
    /// Create a schema with no members.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            id_generator: IdGenerator::default(),
            fields: Vec::new(),
            associations: Vec::new(),
        }
    }

    /// Namespace portion of the class name (empty for the global namespace).
    pub fn namespace(&self) -> &str {
        match self.name.rfind('\\') {
            Some(pos) => &self.name[..pos],
            None => "",
        }
    }

    /// Class name without its namespace.
    pub fn short_name(&self) -> &str {
        match self.name.rfind('\\') {
            Some(pos) => &self.name[pos + 1..],
            None => &self.name,
        }
    }
}

/// Identifier generation strategy.
///
/// With [`IdGenerator::Auto`] the store assigns identifiers, so no setter
/// is generated for the id field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdGenerator {
    #[default]
    Auto,
    None,
}

/// A scalar field mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Field name as declared on the class
    pub name: String,

    /// Scalar type tag (e.g., `string`, `integer`, `datetime`)
    #[serde(rename = "type")]
    pub field_type: String,

    /// Whether the column accepts null
    #[serde(default)]
    pub nullable: bool,

    /// Whether this field is (part of) the identifier
    #[serde(default)]
    pub id: bool,
}

impl FieldMapping {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            nullable: false,
            id: false,
        }
    }
}

/// Association cardinality and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl AssociationKind {
    /// True for collection-valued associations.
    pub fn is_to_many(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }

    pub fn is_many_to_many(self) -> bool {
        matches!(self, Self::ManyToMany)
    }
}

/// An association mapping to another entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationMapping {
    /// Field name holding the association
    pub name: String,

    /// Fully qualified target entity class
    pub target: String,

    /// Cardinality and direction
    pub kind: AssociationKind,

    /// Whether this side holds the join mapping
    #[serde(default = "default_true")]
    pub owning_side: bool,

    /// Property on the owning side that maps back to this class, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,

    /// Join column constraints attached to the association
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub join_columns: Vec<JoinColumn>,

    /// Whether the association is (part of) the identifier
    #[serde(default)]
    pub id: bool,
}

impl AssociationMapping {
    pub fn new(name: impl Into<String>, target: impl Into<String>, kind: AssociationKind) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind,
            owning_side: true,
            mapped_by: None,
            join_columns: Vec::new(),
            id: false,
        }
    }

    /// Target class name without its namespace.
    pub fn target_short_name(&self) -> &str {
        match self.target.rfind('\\') {
            Some(pos) => &self.target[pos + 1..],
            None => &self.target,
        }
    }

    /// Whether the generated to-one setter may accept null.
    ///
    /// Identifier associations are never nullable; otherwise the setter is
    /// nullable unless a non-nullable join column is attached.
    pub fn is_nullable(&self) -> bool {
        if self.id {
            return false;
        }

        !self.join_columns.iter().any(|jc| !jc.nullable)
    }
}

/// A join column constraint on an association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinColumn {
    /// Whether the column accepts null (defaults to true, as in the ORM)
    #[serde(default = "default_true")]
    pub nullable: bool,
}

fn default_true() -> bool {
    true
}
