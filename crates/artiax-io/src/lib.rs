//! Particle list formats for ArtiaX.
//!
//! This crate provides:
//! - **STOPGAP** motive lists in STAR files: record schema, Z-X-Z Euler
//!   convention, reader and writer that preserve every non-particle section
//! - **Format registry** for lookup by name, nickname or file extension
//! - **Configuration** (`ArtiaxConfig`) loaded from TOML

pub mod config;
pub mod error;
pub mod registry;
pub mod stopgap;

pub use config::ArtiaxConfig;
pub use error::{RegistryError, Result};
pub use registry::{FormatRegistry, ParticleFormat, STOPGAP};
pub use stopgap::{Halfset, StopgapParticleData, StopgapRecord, StopgapRotation};
