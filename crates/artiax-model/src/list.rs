//! Format-independent view of a particle list.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::error::{DataError, FormatError};
use crate::particle::ParticleId;
use crate::particle_data::{AttributeRange, ParticleData, PixelSizes};
use crate::record::{DefaultParams, MotlRecord};

/// Object-safe particle list, implemented by every `ParticleData<R>`.
///
/// Callers that handle lists of several formats at once (registries, command
/// line tools) hold a `Box<dyn ParticleList>`.
pub trait ParticleList: Debug {
    fn format_name(&self) -> &'static str;
    fn file_name(&self) -> Option<&Path>;
    fn data_keys(&self) -> &'static [&'static str];
    fn default_params(&self) -> DefaultParams;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn ids(&self) -> Vec<ParticleId>;

    fn value(&self, id: ParticleId, key: &str) -> Result<f64, DataError>;
    fn set_value(&mut self, id: ParticleId, key: &str, value: f64) -> Result<(), DataError>;

    fn pixel_sizes(&self) -> PixelSizes;
    fn set_pixel_sizes(&mut self, pixel_sizes: PixelSizes) -> Result<(), DataError>;

    fn origin(&self, id: ParticleId) -> Result<Vector3<f64>, DataError>;
    fn set_origin(&mut self, id: ParticleId, origin: Vector3<f64>) -> Result<(), DataError>;
    fn translation(&self, id: ParticleId) -> Result<Vector3<f64>, DataError>;
    fn set_translation(&mut self, id: ParticleId, translation: Vector3<f64>)
    -> Result<(), DataError>;
    fn rotation(&self, id: ParticleId) -> Result<Matrix3<f64>, DataError>;
    fn set_rotation(&mut self, id: ParticleId, matrix: &Matrix3<f64>) -> Result<(), DataError>;
    fn placement(&self, id: ParticleId) -> Result<Matrix4<f64>, DataError>;

    fn new_particle(&mut self) -> ParticleId;
    fn delete_data(&mut self, ids: &[ParticleId]) -> usize;
    fn reset_particles(&mut self, ids: &[ParticleId]) -> Result<(), DataError>;
    fn reset_all_particles(&mut self);

    fn attribute_range(&self, key: &str) -> Result<Option<(f64, f64)>, DataError>;
    fn select(&self, ranges: &[AttributeRange]) -> Result<Vec<ParticleId>, DataError>;

    fn reload(&mut self) -> Result<(), FormatError>;
    fn write_file(&self, file_name: Option<&Path>) -> Result<PathBuf, FormatError>;
}

impl<R: MotlRecord> ParticleList for ParticleData<R> {
    fn format_name(&self) -> &'static str {
        R::FORMAT_NAME
    }

    fn file_name(&self) -> Option<&Path> {
        ParticleData::file_name(self)
    }

    fn data_keys(&self) -> &'static [&'static str] {
        R::DATA_KEYS
    }

    fn default_params(&self) -> DefaultParams {
        R::DEFAULT_PARAMS
    }

    fn len(&self) -> usize {
        ParticleData::len(self)
    }

    fn ids(&self) -> Vec<ParticleId> {
        ParticleData::ids(self)
    }

    fn value(&self, id: ParticleId, key: &str) -> Result<f64, DataError> {
        ParticleData::value(self, id, key)
    }

    fn set_value(&mut self, id: ParticleId, key: &str, value: f64) -> Result<(), DataError> {
        ParticleData::set_value(self, id, key, value)
    }

    fn pixel_sizes(&self) -> PixelSizes {
        ParticleData::pixel_sizes(self)
    }

    fn set_pixel_sizes(&mut self, pixel_sizes: PixelSizes) -> Result<(), DataError> {
        ParticleData::set_pixel_sizes(self, pixel_sizes)
    }

    fn origin(&self, id: ParticleId) -> Result<Vector3<f64>, DataError> {
        ParticleData::origin(self, id)
    }

    fn set_origin(&mut self, id: ParticleId, origin: Vector3<f64>) -> Result<(), DataError> {
        ParticleData::set_origin(self, id, origin)
    }

    fn translation(&self, id: ParticleId) -> Result<Vector3<f64>, DataError> {
        ParticleData::translation(self, id)
    }

    fn set_translation(
        &mut self,
        id: ParticleId,
        translation: Vector3<f64>,
    ) -> Result<(), DataError> {
        ParticleData::set_translation(self, id, translation)
    }

    fn rotation(&self, id: ParticleId) -> Result<Matrix3<f64>, DataError> {
        ParticleData::rotation(self, id)
    }

    fn set_rotation(&mut self, id: ParticleId, matrix: &Matrix3<f64>) -> Result<(), DataError> {
        ParticleData::set_rotation(self, id, matrix)
    }

    fn placement(&self, id: ParticleId) -> Result<Matrix4<f64>, DataError> {
        ParticleData::placement(self, id)
    }

    fn new_particle(&mut self) -> ParticleId {
        ParticleData::new_particle(self).id()
    }

    fn delete_data(&mut self, ids: &[ParticleId]) -> usize {
        ParticleData::delete_data(self, ids)
    }

    fn reset_particles(&mut self, ids: &[ParticleId]) -> Result<(), DataError> {
        ParticleData::reset_particles(self, ids)
    }

    fn reset_all_particles(&mut self) {
        ParticleData::reset_all_particles(self)
    }

    fn attribute_range(&self, key: &str) -> Result<Option<(f64, f64)>, DataError> {
        ParticleData::attribute_range(self, key)
    }

    fn select(&self, ranges: &[AttributeRange]) -> Result<Vec<ParticleId>, DataError> {
        ParticleData::select(self, ranges)
    }

    fn reload(&mut self) -> Result<(), FormatError> {
        ParticleData::reload(self)
    }

    fn write_file(&self, file_name: Option<&Path>) -> Result<PathBuf, FormatError> {
        ParticleData::write_file(self, file_name)
    }
}
