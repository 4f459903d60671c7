//! Particle list data model for sub-tomogram averaging motive lists.
//!
//! This crate provides:
//! - **Euler conventions**: the `EulerConvention` trait converting three
//!   stored angles to and from a rotation matrix
//! - **Records**: `MotlRecord`, the fixed schema a file format implements,
//!   with the role mapping (`DefaultParams`) used by format-agnostic code
//! - **Particle data**: `ParticleData<R>`, the ordered particle container with
//!   pixel-size scaling, deletion, reset and attribute selection
//! - **Auxiliary sections**: verbatim file content kept for write-back
//! - **`ParticleList`**: the object-safe view used across formats

pub mod error;
pub mod euler;
pub mod list;
pub mod particle;
pub mod particle_data;
pub mod record;
pub mod sections;

pub use error::{DataError, FormatError};
pub use euler::{Axis, EulerConvention, clamp_unit};
pub use list::ParticleList;
pub use particle::{Particle, ParticleId};
pub use particle_data::{AttributeRange, ParticleData, PixelSizes};
pub use record::{DefaultParams, MotlRecord, Role};
pub use sections::{AuxSections, Section};
