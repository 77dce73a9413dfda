//! TOML schema manifest.
//!
//! A manifest lists the classes to regenerate, each with its scalar
//! fields and associations. Relative class paths are resolved against
//! the manifest's own directory so a manifest can live next to the
//! entity tree it describes.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::errors::{GeneratorError, GeneratorResult};
use crate::schema::ClassSchema;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "class")]
    classes: Vec<ClassSchema>,
}

/// Load class schemas from a TOML manifest at `path`.
pub fn load_manifest(path: &Path) -> GeneratorResult<Vec<ClassSchema>> {
    load_manifest_with_base(path, None)
}

/// Load class schemas, resolving relative class paths against `base`
/// instead of the manifest's directory.
pub fn load_manifest_with_base(
    path: &Path,
    base: Option<&Path>,
) -> GeneratorResult<Vec<ClassSchema>> {
    let raw = fs::read_to_string(path).map_err(|source| GeneratorError::ManifestUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let manifest: Manifest =
        toml::from_str(&raw).map_err(|source| GeneratorError::ManifestInvalid {
            path: path.to_path_buf(),
            source,
        })?;

    let base = match base {
        Some(base) => base,
        None => path.parent().unwrap_or_else(|| Path::new(".")),
    };
    let mut classes = manifest.classes;
    for schema in &mut classes {
        if schema.path.is_relative() {
            schema.path = base.join(&schema.path);
        }
    }

    Ok(classes)
}
