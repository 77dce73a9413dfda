//! Entity class regeneration pipeline.
//!
//! Per target file the pipeline is strictly scanner -> synthesizer ->
//! use resolver -> splicer; no stage feeds back into an earlier one, and
//! nothing is cached across runs. Each file is processed independently:
//! a failure is reported for that file and the batch continues.

mod splicer;
mod stubs;
mod synthesizer;
mod uses;

pub use splicer::FileSections;
pub use stubs::{PhpStubRenderer, Replacements, StubKind, StubRenderer};
pub use synthesizer::{COLLECTION_CLASS, GeneratedFragment, SynthesisContext, synthesize};
pub use uses::{UseTable, current_uses, new_uses, render_uses_block, rewrite_references};

use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::errors::{GeneratorError, GeneratorResult};
use crate::inflector::{RuleSingularizer, Singularize};
use crate::scanner::scan;
use crate::schema::ClassSchema;

/// Suffix appended to the original path when backing up before overwrite.
pub const BACKUP_SUFFIX: &str = "~";

/// Regenerates entity class files from their schemas, preserving
/// hand-written members.
pub struct EntityGenerator {
    backup_existing: bool,
    num_spaces: usize,
    annotation_prefix: String,
    renderer: Box<dyn StubRenderer>,
    singularizer: Box<dyn Singularize>,
}

impl Default for EntityGenerator {
    fn default() -> Self {
        Self {
            backup_existing: true,
            num_spaces: 4,
            annotation_prefix: String::new(),
            renderer: Box::new(PhpStubRenderer),
            singularizer: Box::new(RuleSingularizer),
        }
    }
}

impl EntityGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the target to `<path>~` before overwriting (default true).
    pub fn backup_existing(mut self, backup: bool) -> Self {
        self.backup_existing = backup;
        self
    }

    /// Spaces per indent level for generated fragments (default 4).
    pub fn num_spaces(mut self, num_spaces: usize) -> Self {
        self.num_spaces = num_spaces;
        self
    }

    /// Prefix handed to the stub renderer for metadata annotations; the
    /// core passes it through without interpreting it.
    pub fn annotation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.annotation_prefix = prefix.into();
        self
    }

    /// Replace the stub renderer.
    pub fn renderer(mut self, renderer: impl StubRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the singularization rule set.
    pub fn singularizer(mut self, singularizer: impl Singularize + 'static) -> Self {
        self.singularizer = Box::new(singularizer);
        self
    }

    /// Regenerate every class, isolating failures per file.
    pub fn generate(&self, schemas: &[ClassSchema]) -> Vec<FileReport> {
        schemas
            .iter()
            .map(|schema| match self.write_entity_class(schema) {
                Ok(outcome) => FileReport::success(schema, outcome),
                Err(err) => {
                    warn!("{}: {err}", schema.name);
                    FileReport::failure(schema, &err)
                }
            })
            .collect()
    }

    /// Regenerate one class file: read, update, back up, write.
    pub fn write_entity_class(&self, schema: &ClassSchema) -> GeneratorResult<FileOutcome> {
        let source = fs::read_to_string(&schema.path).map_err(|source| {
            GeneratorError::TargetFileUnreadable {
                path: schema.path.clone(),
                source,
            }
        })?;

        let updated = self.generate_updated_class(schema, &source);

        let backup_path = if self.backup_existing {
            Some(self.backup(schema)?)
        } else {
            None
        };

        fs::write(&schema.path, &updated.content).map_err(|source| GeneratorError::WriteFailed {
            path: schema.path.clone(),
            source,
        })?;

        Ok(FileOutcome {
            path: schema.path.clone(),
            generated: updated.fragments.len(),
            changed: updated.content != source,
            backup_path,
        })
    }

    /// The pure part of the pipeline: produce the regenerated file
    /// content for `schema` from `source`, without touching the
    /// filesystem.
    pub fn generate_updated_class(&self, schema: &ClassSchema, source: &str) -> UpdatedClass {
        let mut index = scan(source);

        let ctx = SynthesisContext {
            renderer: self.renderer.as_ref(),
            singularizer: self.singularizer.as_ref(),
            indent: " ".repeat(self.num_spaces),
            annotation_prefix: self.annotation_prefix.clone(),
        };
        let fragments = synthesize(schema, &mut index, &ctx);
        let body = fragments
            .iter()
            .map(|f| f.code.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut table = current_uses(source);
        let additions = new_uses(&table, &body);
        table.extend(additions);

        let uses_block = render_uses_block(&table, schema.namespace());
        let body = rewrite_references(&table, &body);

        let content = FileSections::split(source).merge(&uses_block, &body);
        debug!(
            "{}: {} new fragment(s), {} import(s)",
            schema.name,
            fragments.len(),
            table.len()
        );

        UpdatedClass { content, fragments }
    }

    fn backup(&self, schema: &ClassSchema) -> GeneratorResult<PathBuf> {
        let mut file_name = schema
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        file_name.push(BACKUP_SUFFIX);
        let backup_path = schema.path.with_file_name(file_name);

        fs::copy(&schema.path, &backup_path).map_err(|source| GeneratorError::BackupFailed {
            path: schema.path.clone(),
            backup_path: backup_path.clone(),
            source,
        })?;

        Ok(backup_path)
    }
}

/// Result of the pure regeneration step.
#[derive(Debug, Clone)]
pub struct UpdatedClass {
    pub content: String,
    pub fragments: Vec<GeneratedFragment>,
}

/// Result of regenerating one file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Number of members synthesized this run
    pub generated: usize,
    /// Whether the written content differs from the original
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
}

/// Per-file entry in a batch report.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub class: String,
    pub path: PathBuf,
    pub generated: usize,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn success(schema: &ClassSchema, outcome: FileOutcome) -> Self {
        Self {
            class: schema.name.clone(),
            path: outcome.path,
            generated: outcome.generated,
            changed: outcome.changed,
            backup_path: outcome.backup_path,
            error: None,
        }
    }

    fn failure(schema: &ClassSchema, err: &GeneratorError) -> Self {
        Self {
            class: schema.name.clone(),
            path: schema.path.clone(),
            generated: 0,
            changed: false,
            backup_path: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}
