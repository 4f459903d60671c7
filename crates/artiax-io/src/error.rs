//! Error types for artiax-io

use std::path::PathBuf;

use artiax_model::{DataError, FormatError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("unknown particle list format: {0}")]
    UnknownFormat(String),

    #[error("format `{0}` cannot be written")]
    NotWritable(&'static str),

    #[error("cannot save a `{list}` particle list as `{requested}`")]
    FormatMismatch {
        list: &'static str,
        requested: &'static str,
    },

    #[error("invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Data(#[from] DataError),
}
