//! Particle list container shared by all formats.
//!
//! Records store voxel values exactly as the format defines them (after the
//! format's origin offset). Pixel sizes are applied on access, so writing a
//! list back never has to undo a scaling step.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, FormatError};
use crate::euler::EulerConvention;
use crate::particle::{Particle, ParticleId};
use crate::record::{DefaultParams, MotlRecord};
use crate::sections::AuxSections;

/// Physical size of one voxel, for origins and for shifts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelSizes {
    pub origin: f64,
    pub translation: f64,
}

impl Default for PixelSizes {
    fn default() -> Self {
        Self {
            origin: 1.0,
            translation: 1.0,
        }
    }
}

impl PixelSizes {
    pub fn validate(&self) -> Result<(), DataError> {
        for value in [self.origin, self.translation] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DataError::InvalidPixelSize(value));
            }
        }
        Ok(())
    }
}

/// Inclusive bounds on one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRange {
    pub key: String,
    pub min: f64,
    pub max: f64,
}

impl AttributeRange {
    pub fn new(key: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            key: key.into(),
            min,
            max,
        }
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone)]
pub struct ParticleData<R: MotlRecord> {
    file_name: Option<PathBuf>,
    pixel_sizes: PixelSizes,
    particles: BTreeMap<ParticleId, Particle<R>>,
    next_id: u64,
    rotation: R::Rotation,
    sections: AuxSections,
}

impl<R: MotlRecord> Default for ParticleData<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: MotlRecord> ParticleData<R> {
    /// Empty list that is not backed by a file.
    pub fn new() -> Self {
        Self {
            file_name: None,
            pixel_sizes: PixelSizes::default(),
            particles: BTreeMap::new(),
            next_id: 0,
            rotation: R::Rotation::default(),
            sections: AuxSections::new(),
        }
    }

    /// Reads a complete list from `path`. Nothing is returned unless the whole
    /// file parsed.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let mut data = Self::new();
        data.replace_from(path)?;
        data.file_name = Some(path.to_path_buf());
        Ok(data)
    }

    /// Re-reads the source file. On failure the current particles stay as
    /// they are.
    pub fn reload(&mut self) -> Result<(), FormatError> {
        let path = self.file_name.clone().ok_or(FormatError::NoTarget)?;
        self.replace_from(&path)
    }

    fn replace_from(&mut self, path: &Path) -> Result<(), FormatError> {
        let (records, sections) = R::read_records(path)?;

        self.particles.clear();
        self.sections = sections;
        for record in records {
            let particle = self.new_particle();
            *particle.record_mut() = record;
            particle.commit();
        }

        info!(
            "read {} {} particles from {}",
            self.particles.len(),
            R::FORMAT_NAME,
            path.display()
        );
        Ok(())
    }

    /// Writes the list to `file_name`, or back to the source file when `None`.
    pub fn write_file(&self, file_name: Option<&Path>) -> Result<PathBuf, FormatError> {
        let path = match file_name {
            Some(path) => path.to_path_buf(),
            None => self.file_name.clone().ok_or(FormatError::NoTarget)?,
        };

        let records: Vec<&R> = self.particles.values().map(Particle::record).collect();
        R::write_records(&path, &records, &self.sections)?;

        info!(
            "wrote {} {} particles to {}",
            records.len(),
            R::FORMAT_NAME,
            path.display()
        );
        Ok(path)
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    pub fn sections(&self) -> &AuxSections {
        &self.sections
    }

    pub fn convention(&self) -> &R::Rotation {
        &self.rotation
    }

    pub fn data_keys(&self) -> &'static [&'static str] {
        R::DATA_KEYS
    }

    pub fn default_params(&self) -> DefaultParams {
        R::DEFAULT_PARAMS
    }

    pub fn pixel_sizes(&self) -> PixelSizes {
        self.pixel_sizes
    }

    pub fn set_pixel_sizes(&mut self, pixel_sizes: PixelSizes) -> Result<(), DataError> {
        pixel_sizes.validate()?;
        self.pixel_sizes = pixel_sizes;
        Ok(())
    }

    pub fn origin_pixelsize(&self) -> f64 {
        self.pixel_sizes.origin
    }

    pub fn set_origin_pixelsize(&mut self, value: f64) -> Result<(), DataError> {
        self.set_pixel_sizes(PixelSizes {
            origin: value,
            ..self.pixel_sizes
        })
    }

    pub fn translation_pixelsize(&self) -> f64 {
        self.pixel_sizes.translation
    }

    pub fn set_translation_pixelsize(&mut self, value: f64) -> Result<(), DataError> {
        self.set_pixel_sizes(PixelSizes {
            translation: value,
            ..self.pixel_sizes
        })
    }

    /// Appends a particle with schema defaults and a fresh id.
    pub fn new_particle(&mut self) -> &mut Particle<R> {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.particles.entry(id).or_insert_with(|| Particle::new(id))
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn ids(&self) -> Vec<ParticleId> {
        self.particles.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle<R>> {
        self.particles.values()
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle<R>> {
        self.particles.get(&id)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle<R>> {
        self.particles.get_mut(&id)
    }

    fn existing(&self, id: ParticleId) -> Result<&Particle<R>, DataError> {
        self.particles.get(&id).ok_or(DataError::UnknownParticle(id))
    }

    fn existing_mut(&mut self, id: ParticleId) -> Result<&mut Particle<R>, DataError> {
        self.particles
            .get_mut(&id)
            .ok_or(DataError::UnknownParticle(id))
    }

    pub fn value(&self, id: ParticleId, key: &str) -> Result<f64, DataError> {
        self.existing(id)?
            .get(key)
            .ok_or_else(|| DataError::UnknownAttribute(key.to_string()))
    }

    pub fn set_value(&mut self, id: ParticleId, key: &str, value: f64) -> Result<(), DataError> {
        self.existing_mut(id)?.set(key, value)
    }

    /// Removes the named particles and returns how many existed.
    pub fn delete_data(&mut self, ids: &[ParticleId]) -> usize {
        let removed = ids
            .iter()
            .filter(|id| self.particles.remove(*id).is_some())
            .count();
        debug!("deleted {removed} of {} requested particles", ids.len());
        removed
    }

    /// Restores the named particles to their last-read values. Unknown ids
    /// fail the call before anything is reset.
    pub fn reset_particles(&mut self, ids: &[ParticleId]) -> Result<(), DataError> {
        if let Some(missing) = ids.iter().find(|id| !self.particles.contains_key(*id)) {
            return Err(DataError::UnknownParticle(*missing));
        }
        for id in ids {
            if let Some(particle) = self.particles.get_mut(id) {
                particle.reset();
            }
        }
        Ok(())
    }

    pub fn reset_all_particles(&mut self) {
        for particle in self.particles.values_mut() {
            particle.reset();
        }
    }

    /// Origin in physical units.
    pub fn origin(&self, id: ParticleId) -> Result<Vector3<f64>, DataError> {
        Ok(self.existing(id)?.record().origin() * self.pixel_sizes.origin)
    }

    pub fn set_origin(&mut self, id: ParticleId, origin: Vector3<f64>) -> Result<(), DataError> {
        let scale = self.pixel_sizes.origin;
        self.existing_mut(id)?.record_mut().set_origin(origin / scale);
        Ok(())
    }

    /// Shift in physical units.
    pub fn translation(&self, id: ParticleId) -> Result<Vector3<f64>, DataError> {
        Ok(self.existing(id)?.record().shift() * self.pixel_sizes.translation)
    }

    pub fn set_translation(
        &mut self,
        id: ParticleId,
        translation: Vector3<f64>,
    ) -> Result<(), DataError> {
        let scale = self.pixel_sizes.translation;
        self.existing_mut(id)?
            .record_mut()
            .set_shift(translation / scale);
        Ok(())
    }

    pub fn rotation(&self, id: ParticleId) -> Result<Matrix3<f64>, DataError> {
        let [a1, a2, a3] = self.existing(id)?.record().angles();
        Ok(self.rotation.matrix_from_angles(a1, a2, a3))
    }

    pub fn set_rotation(&mut self, id: ParticleId, matrix: &Matrix3<f64>) -> Result<(), DataError> {
        let angles = self.rotation.angles_from_matrix(matrix);
        self.existing_mut(id)?.record_mut().set_angles(angles);
        Ok(())
    }

    /// Homogeneous transform placing the particle: rotate, then move to
    /// origin plus shift.
    pub fn placement(&self, id: ParticleId) -> Result<Matrix4<f64>, DataError> {
        let position = self.origin(id)? + self.translation(id)?;
        let rotation = self.rotation(id)?;
        Ok(Matrix4::new_translation(&position) * rotation.to_homogeneous())
    }

    fn check_key(key: &str) -> Result<(), DataError> {
        if R::DATA_KEYS.iter().any(|k| *k == key) {
            Ok(())
        } else {
            Err(DataError::UnknownAttribute(key.to_string()))
        }
    }

    /// Smallest and largest value of `key`, or `None` for an empty list.
    pub fn attribute_range(&self, key: &str) -> Result<Option<(f64, f64)>, DataError> {
        Self::check_key(key)?;
        let range = self
            .particles
            .values()
            .filter_map(|p| p.get(key))
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            });
        Ok(range)
    }

    /// Ids of particles inside every one of `ranges`.
    pub fn select(&self, ranges: &[AttributeRange]) -> Result<Vec<ParticleId>, DataError> {
        for range in ranges {
            Self::check_key(&range.key)?;
        }
        Ok(self
            .particles
            .values()
            .filter(|p| {
                ranges
                    .iter()
                    .all(|r| p.get(&r.key).is_some_and(|v| r.contains(v)))
            })
            .map(Particle::id)
            .collect())
    }

    /// Column-wise copy of every attribute, in schema order.
    pub fn as_columns(&self) -> Vec<(&'static str, Vec<f64>)> {
        R::DATA_KEYS
            .iter()
            .map(|key| {
                let column = self
                    .particles
                    .values()
                    .map(|p| p.get(key).unwrap_or_default())
                    .collect();
                (*key, column)
            })
            .collect()
    }
}
