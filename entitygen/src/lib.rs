//! Entity class regenerator.
//!
//! Regenerates accessor methods, constructors, and imports for PHP entity
//! classes from a declarative schema, while preserving every hand-written
//! member. The pipeline per file is: lexically scan the existing source
//! into a [`scanner::DeclarationIndex`], synthesize stubs for schema
//! members the class does not declare yet, resolve imports for the
//! generated code, and splice the result back into the original file.
//! Running the generator twice over an unchanged schema is a no-op.

pub mod errors;
pub mod generator;
pub mod inflector;
pub mod manifest;
pub mod scanner;
pub mod schema;

pub use errors::{GeneratorError, GeneratorResult};
pub use generator::{EntityGenerator, FileOutcome, FileReport, UpdatedClass};
pub use manifest::{load_manifest, load_manifest_with_base};
pub use scanner::{DeclarationIndex, scan};
pub use schema::{
    AssociationKind, AssociationMapping, ClassSchema, FieldMapping, IdGenerator, JoinColumn,
};
