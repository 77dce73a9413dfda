use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type returned by the entity generator.
///
/// Every variant is scoped to a single target file; a failure on one file
/// never aborts processing of the others.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The target entity file could not be read, so it cannot be scanned.
    #[error("cannot read entity file {path}: {source}")]
    TargetFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backup was requested but the copy failed. The write must not
    /// proceed without a successful backup, so this aborts the file.
    #[error("backup of {path} to {backup_path} failed: {source}")]
    BackupFailed {
        path: PathBuf,
        backup_path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the regenerated file failed.
    #[error("cannot write entity file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The schema manifest could not be read.
    #[error("cannot read manifest {path}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The schema manifest is not valid TOML.
    #[error("invalid manifest {path}: {source}")]
    ManifestInvalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Convenience alias for generator results.
pub type GeneratorResult<T> = Result<T, GeneratorError>;
