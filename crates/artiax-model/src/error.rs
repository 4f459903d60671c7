//! Error types for artiax-model

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::particle::ParticleId;

/// Problems with a particle list file. These are reported to the user.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("syntax error in {} at line {line}: {message}", .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{marker} was not found in any loop section of file {}", .path.display())]
    MissingMarker { marker: String, path: PathBuf },

    #[error("required column `{column}` is missing from table `{table}` in {}", .path.display())]
    MissingColumn {
        column: String,
        table: String,
        path: PathBuf,
    },

    #[error("invalid value `{value}` for `{column}` in row {row} of {}", .path.display())]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("no file name given and the particle list has no source file")]
    NoTarget,
}

/// Misuse of the particle data API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("particle {0} does not exist")]
    UnknownParticle(ParticleId),

    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),

    #[error("invalid pixel size {0}: must be finite and positive")]
    InvalidPixelSize(f64),
}
